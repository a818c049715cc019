//! One user's generation session.
//!
//! Holds the status board and the latest finished image, and enforces a
//! single in-flight generation: a second submit while one is running fails
//! with [`AdhyatmikError::Busy`] instead of racing the first.

use tokio::sync::{Mutex, RwLock};

use super::{Generator, StatusBoard};
use crate::error::{AdhyatmikError, Result};
use crate::model::{CaptionRequest, CompositionResult};

pub struct Studio {
    generator: Generator,
    status: StatusBoard,
    latest: RwLock<Option<CompositionResult>>,
    in_flight: Mutex<()>,
}

impl Studio {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            status: StatusBoard::new(),
            latest: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Whether a generation is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// The most recent successful image, if the last attempt succeeded.
    pub async fn latest(&self) -> Option<CompositionResult> {
        self.latest.read().await.clone()
    }

    /// Run a generation. The previous image is cleared before the attempt starts.
    pub async fn submit(&self, request: &CaptionRequest) -> Result<CompositionResult> {
        let _in_flight = self.in_flight.try_lock().map_err(|_| AdhyatmikError::Busy)?;
        *self.latest.write().await = None;

        let image = self.generator.generate(request, &self.status).await?;
        *self.latest.write().await = Some(image.clone());
        Ok(image)
    }
}
