//! Registry for dataset sources and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{SourceKind, SourceMeta};
use crate::ports::{DatasetLocation, DatasetPort, PortError};

/// A dataset port together with the metadata describing it.
pub struct SourcePlugin {
    /// Static metadata describing the source.
    pub meta: SourceMeta,
    /// Implementation for loading datasets.
    pub dataset_port: Arc<dyn DatasetPort>,
}

/// Registry that resolves plugins by source kind.
pub struct SourceRegistry {
    plugins: HashMap<SourceKind, SourcePlugin>,
}

impl SourceRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<SourcePlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.kind, plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Look up the plugin for a source kind.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSource`] when no plugin is registered.
    pub fn plugin(&self, kind: SourceKind) -> Result<&SourcePlugin, PortError> {
        self.plugins
            .get(&kind)
            .ok_or(PortError::UnsupportedSource(kind))
    }

    /// Look up the plugin able to read `location`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSource`] when no plugin is registered.
    pub fn resolve(&self, location: &DatasetLocation) -> Result<&SourcePlugin, PortError> {
        self.plugin(location.kind())
    }
}
