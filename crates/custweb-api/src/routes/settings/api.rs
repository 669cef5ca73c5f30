//! Settings API endpoints - JSON API

use crate::AppState;

pub async fn api_settings(state: axum::extract::State<AppState>) -> axum::Json<custweb_config::Config> {
    axum::Json(state.config.clone())
}
