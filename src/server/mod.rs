//! # HTTP Server
//!
//! JSON API around a single generation [`Studio`](crate::pipeline::Studio).
//!
//! ## Usage
//!
//! ```bash
//! adhyatmik serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/generate` | run the pipeline, returns a data URL |
//! | `GET /api/status` | current status message |
//! | `GET /api/aspect-ratios` | selectable ratios |
//! | `GET /api/examples` | example captions |
//! | `GET /api/image` | latest image (inline) |
//! | `GET /api/image/download` | latest image as attachment |

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::{AdhyatmikError, Result};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate", post(handlers::generate::generate))
        .route("/api/status", get(handlers::meta::status))
        .route("/api/aspect-ratios", get(handlers::meta::aspect_ratios))
        .route("/api/examples", get(handlers::meta::examples))
        .route("/api/image", get(handlers::image::preview))
        .route("/api/image/download", get(handlers::image::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use adhyatmik::server::{serve, AppState};
///
/// # async fn example(state: Arc<AppState>) -> Result<(), adhyatmik::AdhyatmikError> {
/// serve(state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let listen_addr = state.config.listen_addr.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| AdhyatmikError::Config(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    tracing::info!(addr = %listen_addr, "adhyatmik HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
