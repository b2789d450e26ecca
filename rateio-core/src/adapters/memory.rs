//! In-memory sheet source for tests and demos

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::SheetConfig;
use crate::ports::SheetSource;

/// Serves a fixed payload, or a fixed error
#[derive(Debug)]
pub struct MemorySheetSource {
    payload: Mutex<std::result::Result<String, String>>,
    requests: Mutex<Vec<SheetConfig>>,
}

impl MemorySheetSource {
    pub fn new(csv: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Ok(csv.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A source whose every fetch fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Err(message.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replace the payload served by later fetches
    pub fn set_payload(&self, csv: impl Into<String>) {
        if let Ok(mut payload) = self.payload.lock() {
            *payload = Ok(csv.into());
        }
    }

    /// Make later fetches fail
    pub fn set_error(&self, message: impl Into<String>) {
        if let Ok(mut payload) = self.payload.lock() {
            *payload = Err(message.into());
        }
    }

    /// Sheet selections received so far
    pub fn requests(&self) -> Vec<SheetConfig> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SheetSource for MemorySheetSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, sheet: &SheetConfig) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(sheet.clone());
        }
        let payload = self
            .payload
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?;
        payload.clone().map_err(Error::Fetch)
    }
}
