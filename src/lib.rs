//! # Adhyatmik - Caption Image Generator
//!
//! Adhyatmik turns a short (typically Hindi) caption into a finished image:
//! an AI-generated background with the caption word-wrapped, sized,
//! colored and shadowed on top according to an AI placement plan.
//!
//! - **Compositing engine**: deterministic layout and rendering ([`compose`])
//! - **Pipeline**: plan → synthesize → analyze → compose, with a rotating
//!   status indicator ([`pipeline`])
//! - **Collaborators**: the generative services behind a trait ([`services`])
//! - **Server**: a small JSON API for previews and downloads ([`server`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use adhyatmik::{
//!     compose::Compositor,
//!     config::Config,
//!     model::{AspectRatio, CaptionRequest},
//!     pipeline::{Generator, StatusBoard},
//!     services::GeminiBackend,
//! };
//!
//! # async fn run() -> Result<(), adhyatmik::AdhyatmikError> {
//! let config = Config::from_env();
//! let backend = Arc::new(GeminiBackend::new(config.backend.clone())?);
//! let compositor = Arc::new(Compositor::new(config.engine.clone()));
//! let generator = Generator::new(backend, compositor);
//!
//! let request = CaptionRequest::new("कर्म करो, फल की चिंता मत करो।", AspectRatio::Portrait);
//! let image = generator.generate(&request, &StatusBoard::new()).await?;
//! std::fs::write("adhyatmik_image.jpg", &image.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | Requests, plans, directives and results |
//! | [`compose`] | Fonts, layout, colors and rendering |
//! | [`services`] | AI collaborator trait and Gemini backend |
//! | [`pipeline`] | Orchestration, status ticker, sessions |
//! | [`server`] | HTTP API |
//! | [`config`] | Runtime configuration |
//! | [`error`] | Error types |

pub mod compose;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod services;

// Re-exports for convenience
pub use compose::Compositor;
pub use config::Config;
pub use error::AdhyatmikError;
pub use pipeline::{Generator, StatusBoard, Studio};
