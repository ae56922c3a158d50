//! Catalog gateway trait and its HTTP implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use curator_common::BoundingBox;

use crate::config::ProviderConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::features::{Feature, FeatureCollection};

/// The external catalog gateway.
///
/// One implementation talks to the real provider; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search products by type, date range and bounding box.
    async fn search(
        &self,
        product_code: &str,
        start: NaiveDate,
        end: NaiveDate,
        bbox: &BoundingBox,
    ) -> CatalogResult<FeatureCollection>;

    /// Download a product archive into `output_dir` without extracting it.
    ///
    /// Returns the path of the downloaded archive.
    async fn download(&self, feature: &Feature, output_dir: &Path) -> CatalogResult<PathBuf>;

    /// Read a feature collection previously serialized to `path`.
    async fn deserialize(&self, path: &Path) -> CatalogResult<FeatureCollection> {
        let content = fs::read(path).await?;
        let collection: FeatureCollection = serde_json::from_slice(&content)?;
        Ok(collection)
    }
}

/// Catalog implementation over the provider's HTTP API.
pub struct HttpCatalog {
    client: Client,
    config: ProviderConfig,
}

impl HttpCatalog {
    /// Create a catalog client for the given provider.
    pub fn new(config: ProviderConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(username) => request.basic_auth(username, self.config.password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[instrument(skip(self), fields(provider = %self.config.name))]
    async fn search(
        &self,
        product_code: &str,
        start: NaiveDate,
        end: NaiveDate,
        bbox: &BoundingBox,
    ) -> CatalogResult<FeatureCollection> {
        let url = format!("{}/search.json", self.config.endpoint);

        let request = self.client.get(&url).query(&[
            ("productType", product_code),
            ("startDate", &start.to_string()),
            ("completionDate", &end.to_string()),
            ("box", &bbox.to_query_value()),
        ]);

        let response = self.with_auth(request).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status(),
                url,
            });
        }

        let collection: FeatureCollection = response.json().await?;

        info!(
            product_code = product_code,
            count = collection.features.len(),
            "Catalog search completed"
        );

        Ok(collection)
    }

    #[instrument(skip(self, feature), fields(id = %feature.id))]
    async fn download(&self, feature: &Feature, output_dir: &Path) -> CatalogResult<PathBuf> {
        let url = feature
            .download_url()
            .ok_or_else(|| CatalogError::MissingDownloadUrl(feature.id.clone()))?
            .to_string();

        fs::create_dir_all(output_dir).await?;
        let archive_path = output_dir.join(format!("{}.zip", feature.id));

        let response = self.with_auth(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status(),
                url,
            });
        }

        let mut file = fs::File::create(&archive_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        debug!(path = %archive_path.display(), bytes = written, "Archive written");

        Ok(archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FileOnlyCatalog;

    #[async_trait]
    impl Catalog for FileOnlyCatalog {
        async fn search(
            &self,
            _product_code: &str,
            _start: NaiveDate,
            _end: NaiveDate,
            _bbox: &BoundingBox,
        ) -> CatalogResult<FeatureCollection> {
            Ok(FeatureCollection::new())
        }

        async fn download(
            &self,
            _feature: &Feature,
            _output_dir: &Path,
        ) -> CatalogResult<PathBuf> {
            unimplemented!("not exercised")
        }
    }

    #[tokio::test]
    async fn test_default_deserialize_reads_collection_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let collection = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "tile-1",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                },
                "properties": {}
            }]
        });
        std::fs::write(&path, collection.to_string()).unwrap();

        let parsed = FileOnlyCatalog.deserialize(&path).await.unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].id, "tile-1");
    }

    #[tokio::test]
    async fn test_deserialize_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileOnlyCatalog.deserialize(&path).await,
            Err(CatalogError::Json(_))
        ));
    }
}
