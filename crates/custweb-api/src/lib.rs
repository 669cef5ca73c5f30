//! HTTP console server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::customers: Customer list, create and edit forms
//! - routes::transactions: Transaction screens and their filter/poll endpoints
//! - routes::generator: Synthetic data generation forms
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;
pub mod screens;

use axum::{
    routing::{get, post},
    Router,
};
use custweb_client::{DirectoryRef, GeneratorRef, SourceRef};
use custweb_config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::{ApiError, ApiResult, JsonError, JsonResult};
pub use screens::{Screen, ScreenRegistry};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub directory: DirectoryRef,
    pub source: SourceRef,
    pub generator: GeneratorRef,
    pub screens: Arc<RwLock<ScreenRegistry>>,
}

impl AppState {
    pub fn new(config: Config, directory: DirectoryRef, source: SourceRef, generator: GeneratorRef) -> Self {
        let screens = ScreenRegistry::new(config.screens.max_open);
        Self {
            config,
            directory,
            source,
            generator,
            screens: Arc::new(RwLock::new(screens)),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::customers::{htmx_customer_store, htmx_customer_update, page_customer_edit, page_customer_new, page_customers};
    use routes::generator::{htmx_generate_customers, htmx_generate_transactions, page_generate};
    use routes::settings::{api_settings, page_settings};
    use routes::transactions::{api_screen, api_screen_filter, htmx_screen_close, htmx_screen_filter, htmx_screen_view, page_customer_transactions};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/settings", get(api_settings))
        .route("/api/screens/:screen", get(api_screen))
        .route("/api/screens/:screen/filter", post(api_screen_filter))
        // Pages
        .route("/", get(page_customers))
        .route("/customers", get(page_customers).post(htmx_customer_store))
        .route("/customers/new", get(page_customer_new))
        .route("/customers/:id", get(page_customer_edit).post(htmx_customer_update))
        .route("/customers/:id/transactions", get(page_customer_transactions))
        .route("/generate", get(page_generate))
        .route("/settings", get(page_settings))
        // HTMX partials
        .route("/screens/:screen", axum::routing::delete(htmx_screen_close))
        .route("/screens/:screen/filter", post(htmx_screen_filter))
        .route("/screens/:screen/view", get(htmx_screen_view))
        .route("/generate/customers", post(htmx_generate_customers))
        .route("/generate/transactions", post(htmx_generate_transactions))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - 客户管理</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        custweb_utils::escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/customers", "客户", "customers"),
        ("/generate", "资料产生", "generate"),
        ("/settings", "设置", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>客户管理</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = current_path.starts_with(path) || (*id == "customers" && current_path == "/");
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "customers" => "👥",
            "generate" => "🧪",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!("<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>", inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Inline notice box; `level` is info, warning or error
pub fn notice_html(level: &str, message: &str) -> String {
    let class = match level {
        "error" => "bg-red-50 text-red-700 border-red-200",
        "warning" => "bg-yellow-50 text-yellow-800 border-yellow-200",
        _ => "bg-green-50 text-green-700 border-green-200",
    };
    format!(
        "<div class='notice mb-3 px-4 py-2 rounded-lg border {}' role='alert'>{}</div>",
        class,
        custweb_utils::escape_html(message)
    )
}

/// Start the HTTP server
///
/// Binds `server.host:server.port` and serves until Ctrl-C.
pub async fn start_server(
    config: Config,
    directory: DirectoryRef,
    source: SourceRef,
    generator: GeneratorRef,
) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, directory, source, generator);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "custweb::api", "Starting console on http://{}", addr);
    log::info!(target: "custweb::api", "Available routes:");
    log::info!(target: "custweb::api", "  - /customers (Customer list)");
    log::info!(target: "custweb::api", "  - /customers/:id/transactions (Transaction screen)");
    log::info!(target: "custweb::api", "  - /generate (Data generator)");
    log::info!(target: "custweb::api", "  - /settings (Configuration)");
    log::info!(target: "custweb::api", "  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!(target: "custweb::api", "Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    log::info!(target: "custweb::api", "Server stopped gracefully");
    Ok(())
}
