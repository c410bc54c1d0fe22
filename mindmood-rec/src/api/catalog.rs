//! Read-only vocabulary and catalog listings

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use mindmood_common::{CatalogItem, EmotionClass};

use crate::AppState;

/// One canonical class with its vector position
#[derive(Debug, Serialize)]
pub struct EmotionEntry {
    pub index: usize,
    pub name: EmotionClass,
    pub label: &'static str,
}

/// GET /api/emotions
///
/// Canonical vocabulary in vector order.
pub async fn get_emotions() -> Json<Vec<EmotionEntry>> {
    Json(
        EmotionClass::all()
            .iter()
            .map(|class| EmotionEntry {
                index: class.index(),
                name: *class,
                label: class.as_label(),
            })
            .collect(),
    )
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub items: Vec<CatalogItem>,
}

/// GET /api/catalog
///
/// Catalog items in natural (tie-break) order.
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.recommender.catalog();
    Json(CatalogResponse {
        count: catalog.len(),
        items: catalog.items().to_vec(),
    })
}

pub fn vocabulary_routes() -> Router<AppState> {
    Router::new()
        .route("/api/emotions", get(get_emotions))
        .route("/api/catalog", get(get_catalog))
}
