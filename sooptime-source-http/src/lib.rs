//! Dataset source that downloads CSV documents over HTTP(S).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use sooptime_core::{
    model::{RawRow, SourceKind, SourceMeta},
    plugin::SourcePlugin,
    ports::{DatasetLocation, DatasetPort, PortError},
    table::read_table,
};

/// Dataset port backed by an HTTP client.
pub struct HttpDatasetPort {
    client: Client,
    meta: SourceMeta,
}

impl HttpDatasetPort {
    /// Create a new dataset port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            meta: source_meta(),
        }
    }
}

#[async_trait]
impl DatasetPort for HttpDatasetPort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn load(&self, location: &DatasetLocation) -> Result<Vec<RawRow>, PortError> {
        let DatasetLocation::Url(url) = location else {
            return Err(PortError::UnsupportedSource(location.kind()));
        };

        let body = fetch_bytes(self.client.get(url)).await?;
        debug!(%url, bytes = body.len(), "Downloaded dataset");

        read_table(body.as_slice())
    }
}

/// Build the plugin bundle for the HTTP source.
#[must_use]
pub fn plugin(client: Client) -> SourcePlugin {
    SourcePlugin {
        meta: source_meta(),
        dataset_port: Arc::new(HttpDatasetPort::new(client)),
    }
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        kind: SourceKind::Http,
        name: String::from("HTTP(S)"),
    }
}

// Small helper to fetch a body with status handling.
async fn fetch_bytes(req: RequestBuilder) -> Result<Vec<u8>, PortError> {
    let bytes = req
        .send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .bytes()
        .await
        .map_err(PortError::from)?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn file_locations_are_rejected() {
        let port = HttpDatasetPort::new(Client::new());
        let result = port
            .load(&DatasetLocation::Path(PathBuf::from("facilities.csv")))
            .await;

        assert!(matches!(
            result,
            Err(PortError::UnsupportedSource(SourceKind::File))
        ));
    }

    #[test]
    fn plugin_registers_as_http() {
        let plugin = plugin(Client::new());
        assert_eq!(plugin.meta.kind, SourceKind::Http);
        assert_eq!(plugin.dataset_port.source().kind, SourceKind::Http);
    }
}
