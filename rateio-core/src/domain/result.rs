//! Result and error types for the core library

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Core library error type
///
/// Only the fetch boundary and the configuration layer produce errors.
/// Cell-level parsing never fails; it degrades to zero or `None`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Envelope for `--json` output
///
/// `context` describes the data behind `data` (sheet, year filter, fetch
/// time) so consumers do not have to re-derive it.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    pub fn ok_with_context(data: T, context: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: Some(context),
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_json() {
        let mut context = BTreeMap::new();
        context.insert("sheet".to_string(), json!("Página1"));
        let result = OperationResult::ok_with_context(vec![1, 2], context);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], json!([1, 2]));
        assert!(value["error"].is_null());
        assert_eq!(value["context"]["sheet"], "Página1");

        let plain = serde_json::to_value(OperationResult::ok(7)).unwrap();
        assert!(plain.get("context").is_none());
    }

    #[test]
    fn test_fail_envelope_carries_error_text() {
        let err = Error::fetch("HTTP 502");
        let result: OperationResult<()> = OperationResult::fail(err.to_string());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["data"].is_null());
        assert_eq!(value["error"], "Fetch error: HTTP 502");
    }
}
