//! # Configuration
//!
//! Runtime settings for the AI backend, the compositing engine and the HTTP
//! server. Values come from the environment, with CLI flags layered on top by
//! the binary.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `GEMINI_API_KEY` / `API_KEY` | API key for the Gemini backend | (none) |
//! | `ADHYATMIK_API_BASE` | REST endpoint root | `https://generativelanguage.googleapis.com/v1beta` |
//! | `ADHYATMIK_TEXT_MODEL` | planning + analysis model | `gemini-2.5-flash` |
//! | `ADHYATMIK_IMAGE_MODEL` | background synthesis model | `imagen-4.0-generate-001` |
//! | `ADHYATMIK_FONT_DIR` | extra directory of `.ttf`/`.otf` faces | (none) |
//! | `ADHYATMIK_LISTEN` | server listen address | `0.0.0.0:8080` |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AdhyatmikError, Result};

/// Settings for the Gemini HTTP backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl BackendConfig {
    /// The API key, or a configuration error if none was provided.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AdhyatmikError::Config(
                    "no API key: set GEMINI_API_KEY (or API_KEY) or pass --api-key".to_string(),
                )
            })
    }
}

/// Settings for the compositing engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Canvas width cap in pixels.
    pub max_canvas_width: u32,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Extra font directory searched in addition to system fonts.
    pub font_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_canvas_width: 1080,
            jpeg_quality: 92,
            font_dir: None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
    /// How often the status message rotates while a generation is pending.
    pub status_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
            status_period: Duration::from_millis(2500),
        }
    }
}

impl Config {
    /// Build a configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.backend.api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));
        if let Some(base) = non_empty("ADHYATMIK_API_BASE") {
            config.backend.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty("ADHYATMIK_TEXT_MODEL") {
            config.backend.text_model = model;
        }
        if let Some(model) = non_empty("ADHYATMIK_IMAGE_MODEL") {
            config.backend.image_model = model;
        }
        if let Some(dir) = non_empty("ADHYATMIK_FONT_DIR") {
            config.engine.font_dir = Some(PathBuf::from(dir));
        }
        if let Some(addr) = non_empty("ADHYATMIK_LISTEN") {
            config.server.listen_addr = addr;
        }
        config
    }
}
