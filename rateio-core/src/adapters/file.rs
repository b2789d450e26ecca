//! Local CSV export as a sheet source

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::SheetConfig;
use crate::ports::SheetSource;
use super::http::check_csv_body;

/// Reads a CSV file exported from the sheet
///
/// The sheet name and range are ignored: the file already holds one sheet.
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SheetSource for FileSheetSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, _sheet: &SheetConfig) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::fetch(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        check_csv_body(&text)?;
        Ok(text)
    }
}
