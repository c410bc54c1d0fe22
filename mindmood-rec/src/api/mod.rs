//! HTTP API handlers for mindmood-rec

pub mod analyze;
pub mod catalog;
pub mod recommend;
pub mod status;

pub use analyze::{analyze_routes, analyze_text, analyze_voice};
pub use catalog::{get_catalog, get_emotions, vocabulary_routes};
pub use recommend::{recommend_form, recommend_json, recommend_routes};
pub use status::{build_info, health, status_routes, BuildInfo};
