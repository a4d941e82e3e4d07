//! Dataset source that reads CSV documents from the local filesystem.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sooptime_core::{
    model::{RawRow, SourceKind, SourceMeta},
    plugin::SourcePlugin,
    ports::{DatasetLocation, DatasetPort, PortError},
    table::read_table,
};

/// Dataset port reading files with `tokio::fs`.
pub struct FileDatasetPort {
    meta: SourceMeta,
}

impl FileDatasetPort {
    /// Create a new file dataset port.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: source_meta(),
        }
    }
}

impl Default for FileDatasetPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetPort for FileDatasetPort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn load(&self, location: &DatasetLocation) -> Result<Vec<RawRow>, PortError> {
        let DatasetLocation::Path(path) = location else {
            return Err(PortError::UnsupportedSource(location.kind()));
        };

        let contents = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = contents.len(), "Read dataset");

        read_table(contents.as_slice())
    }
}

/// Build the plugin bundle for the file source.
#[must_use]
pub fn plugin() -> SourcePlugin {
    SourcePlugin {
        meta: source_meta(),
        dataset_port: Arc::new(FileDatasetPort::new()),
    }
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        kind: SourceKind::File,
        name: String::from("Local file"),
    }
}
