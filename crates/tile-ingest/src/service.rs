//! The tile ingestion service.
//!
//! Sequential pipeline over the catalog gateway and the tile store. No
//! concurrency control: two callers downloading the same tile would race on
//! its bookkeeping fields.

use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use catalog_client::{Catalog, FeatureCollection};
use curator_common::{BoundingBox, CuratorError, Product, Ring};
use tile_store::{NewTile, TileRecord, TileStore};

use crate::bands::{self, TargetImage};
use crate::error::{IngestError, IngestResult};
use crate::metadata::{self, TileMetadata};

/// Catalog property carrying the acquisition timestamp.
const ACQUISITION_PROPERTY: &str = "startTimeFromAscendingNode";

/// External context threaded through for log correlation only.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub source_id: String,
}

/// Settings for the tile service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Default for a new tile's to-be-downloaded flag.
    pub to_be_downloaded: bool,
    /// Directory raster archives are downloaded into.
    pub download_dir: PathBuf,
}

/// Searches the catalog, persists tiles, and runs download bookkeeping.
pub struct TileService<C> {
    catalog: C,
    store: TileStore,
    config: ServiceConfig,
}

impl<C: Catalog> TileService<C> {
    pub fn new(catalog: C, store: TileStore, config: ServiceConfig) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// The underlying tile store.
    pub fn store(&self) -> &TileStore {
        &self.store
    }

    /// Search the catalog for products intersecting a polygon's envelope
    /// within a date range.
    #[instrument(skip(self, polygon))]
    pub async fn search_by_polygon(
        &self,
        product: Product,
        start_date: NaiveDate,
        end_date: NaiveDate,
        polygon: &Ring,
    ) -> IngestResult<FeatureCollection> {
        let product_code = product.provider_code()?;
        let bbox = BoundingBox::envelope(polygon).ok_or(CuratorError::EmptyExtent)?;

        debug!(
            product_code = product_code,
            bbox = %bbox.to_query_value(),
            "Searching catalog"
        );

        let results = self
            .catalog
            .search(product_code, start_date, end_date, &bbox)
            .await?;

        Ok(results)
    }

    /// Map catalog search results into persisted tile records.
    ///
    /// Duplicate external identifiers insert duplicate rows; deduplication
    /// is left to operators.
    #[instrument(skip(self, results), fields(collection_id = %collection_id))]
    pub async fn record_search_results(
        &self,
        results: &FeatureCollection,
        product: Product,
        collection_id: Uuid,
    ) -> IngestResult<Vec<TileRecord>> {
        let mut tiles = Vec::with_capacity(results.features.len());

        for feature in &results.features {
            let timestamp = feature
                .property_str(ACQUISITION_PROPERTY)
                .ok_or_else(|| IngestError::MissingProperty(ACQUISITION_PROPERTY.to_string()))?;
            let date = curator_common::parse_acquisition_date(timestamp)?;

            let boundary = feature.geometry.boundary_ring()?;

            let tile = self
                .store
                .insert_tile(NewTile {
                    product,
                    tile_id: feature.id.clone(),
                    date,
                    boundary,
                    catalog_data: serde_json::to_value(feature)?,
                    to_be_downloaded: self.config.to_be_downloaded,
                    collection_id,
                })
                .await?;

            debug!(
                tile_id = %tile.tile_id,
                collection_id = %collection_id,
                "Satellite image tile created"
            );

            tiles.push(tile);
        }

        info!(count = tiles.len(), "Recorded catalog search results");

        Ok(tiles)
    }

    /// Download a tile's raster archive, updating its bookkeeping fields.
    ///
    /// The stored payload is round-tripped through the gateway deserializer
    /// via a temporary single-feature collection file, matching the contract
    /// the download call expects. The attempt counter and start timestamp are
    /// persisted before the download; a download failure propagates with
    /// those already written and without an end timestamp.
    #[instrument(skip(self, tile, source), fields(tile_id = %tile.tile_id, source_id = %source.source_id))]
    pub async fn download(
        &self,
        tile: &mut TileRecord,
        source: &SourceData,
    ) -> IngestResult<PathBuf> {
        info!("Downloading satellite image tile");

        let collection = FeatureCollection {
            type_: "FeatureCollection".to_string(),
            features: vec![serde_json::from_value(tile.catalog_data.clone())?],
        };

        let mut temp_file = NamedTempFile::new()?;
        serde_json::to_writer(&mut temp_file, &collection)?;
        temp_file.flush()?;
        debug!(path = %temp_file.path().display(), "Wrote temporary collection file");

        let results = self.catalog.deserialize(temp_file.path()).await?;
        temp_file.close()?;

        let feature = results
            .features
            .first()
            .ok_or(catalog_client::CatalogError::EmptyResults)?;

        tile.dl_attempts += 1;
        tile.dl_start_time = Some(Utc::now());
        self.store.save_tile(tile).await?;
        debug!(attempts = tile.dl_attempts, "Download attempt recorded");

        let archive = self
            .catalog
            .download(feature, &self.config.download_dir)
            .await?;

        tile.is_downloaded = true;
        tile.dl_end_time = Some(Utc::now());
        self.store.save_tile(tile).await?;

        info!(archive = %archive.display(), "Download completed");

        Ok(archive)
    }

    /// Extract metadata from a tile's stored catalog payload.
    ///
    /// Only the Sentinel-2 family has extraction logic.
    #[instrument(skip(self, tile, source), fields(tile_id = %tile.tile_id, source_id = %source.source_id))]
    pub fn fetch_metadata(
        &self,
        tile: &TileRecord,
        source: &SourceData,
    ) -> IngestResult<TileMetadata> {
        metadata::extract(tile)
    }

    /// Rename extracted band files into the normalized scheme and list them.
    #[instrument(skip(self, tile, source), fields(tile_id = %tile.tile_id, source_id = %source.source_id))]
    pub fn fetch_target_images(
        &self,
        tile: &TileRecord,
        source: &SourceData,
    ) -> IngestResult<Vec<TargetImage>> {
        let folder = tile
            .extracted_path
            .as_deref()
            .ok_or(IngestError::MissingExtractedPath(tile.id))?;

        match tile.product {
            Product::Sentinel2 => bands::rename_band_files(folder),
            Product::Sentinel1 => Err(IngestError::Unimplemented(tile.product)),
            other => Err(CuratorError::UnsupportedProduct(other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use async_trait::async_trait;
    use serde_json::json;

    use catalog_client::{CatalogError, CatalogResult, Feature};

    /// In-memory catalog double, optionally failing the download step.
    struct FakeCatalog {
        search_result: FeatureCollection,
        fail_download: bool,
    }

    impl FakeCatalog {
        fn with_features(features: Vec<Feature>) -> Self {
            Self {
                search_result: FeatureCollection {
                    type_: "FeatureCollection".to_string(),
                    features,
                },
                fail_download: false,
            }
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn search(
            &self,
            _product_code: &str,
            _start: NaiveDate,
            _end: NaiveDate,
            _bbox: &BoundingBox,
        ) -> CatalogResult<FeatureCollection> {
            Ok(self.search_result.clone())
        }

        async fn download(&self, feature: &Feature, output_dir: &Path) -> CatalogResult<PathBuf> {
            if self.fail_download {
                return Err(CatalogError::MissingDownloadUrl(feature.id.clone()));
            }
            Ok(output_dir.join(format!("{}.zip", feature.id)))
        }
    }

    fn polygon_feature(id: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "id": id,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]]]
            },
            "properties": {
                "startTimeFromAscendingNode": "2023-01-07T06:31:29.024Z"
            }
        }))
        .unwrap()
    }

    fn multipolygon_feature(id: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "id": id,
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[10.0, 10.0], [11.0, 10.0], [11.0, 11.0], [10.0, 10.0]]],
                    [[[20.0, 20.0], [21.0, 20.0], [21.0, 21.0], [20.0, 20.0]]]
                ]
            },
            "properties": {
                "startTimeFromAscendingNode": "2023-01-08T06:31:29.024Z"
            }
        }))
        .unwrap()
    }

    fn point_feature(id: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "id": id,
            "geometry": {"type": "Point", "coordinates": [54.0, 24.0]},
            "properties": {
                "startTimeFromAscendingNode": "2023-01-08T06:31:29.024Z"
            }
        }))
        .unwrap()
    }

    async fn service_with(catalog: FakeCatalog) -> TileService<FakeCatalog> {
        let store = TileStore::open_memory().await.unwrap();
        TileService::new(
            catalog,
            store,
            ServiceConfig {
                to_be_downloaded: true,
                download_dir: std::env::temp_dir().join("curator-test-downloads"),
            },
        )
    }

    fn source() -> SourceData {
        SourceData {
            source_id: "test-source".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_rejects_unsupported_product() {
        let service = service_with(FakeCatalog::with_features(vec![])).await;
        let ring = vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]];

        let err = service
            .search_by_polygon(
                Product::Landsat8,
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
                &ring,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Domain(CuratorError::UnsupportedProduct(Product::Landsat8))
        ));
    }

    #[tokio::test]
    async fn test_record_results_maps_geometries() {
        let service = service_with(FakeCatalog::with_features(vec![
            polygon_feature("poly"),
            multipolygon_feature("multi"),
        ]))
        .await;

        let ring = vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]];
        let results = service
            .search_by_polygon(
                Product::Sentinel2,
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
                &ring,
            )
            .await
            .unwrap();

        let collection_id = Uuid::new_v4();
        let tiles = service
            .record_search_results(&results, Product::Sentinel2, collection_id)
            .await
            .unwrap();

        assert_eq!(tiles.len(), 2);
        // Polygon: first ring
        assert_eq!(tiles[0].boundary[0], [54.0, 24.0]);
        // MultiPolygon: first ring of first polygon
        assert_eq!(tiles[1].boundary[0], [10.0, 10.0]);
        assert_eq!(
            tiles[0].date,
            NaiveDate::from_ymd_opt(2023, 1, 7).unwrap()
        );
        assert!(tiles.iter().all(|t| t.to_be_downloaded));
        assert!(tiles.iter().all(|t| t.collection_id == collection_id));
    }

    #[tokio::test]
    async fn test_record_results_rejects_point_geometry() {
        let service = service_with(FakeCatalog::with_features(vec![point_feature("pt")])).await;

        let results = FeatureCollection::single(point_feature("pt"));
        let err = service
            .record_search_results(&results, Product::Sentinel2, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Domain(CuratorError::UnexpectedGeometry(_))
        ));
    }

    #[tokio::test]
    async fn test_download_bookkeeping() {
        let service = service_with(FakeCatalog::with_features(vec![])).await;

        let mut tile = service
            .store()
            .insert_tile(NewTile {
                product: Product::Sentinel2,
                tile_id: "tile-1".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(),
                boundary: vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]],
                catalog_data: serde_json::to_value(polygon_feature("tile-1")).unwrap(),
                to_be_downloaded: true,
                collection_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        service.download(&mut tile, &source()).await.unwrap();

        let persisted = service.store().get_tile(tile.id).await.unwrap();
        assert_eq!(persisted.dl_attempts, 1);
        assert!(persisted.is_downloaded);
        assert!(persisted.dl_start_time.is_some());
        assert!(persisted.dl_end_time.is_some());
    }

    #[tokio::test]
    async fn test_failed_download_keeps_attempt_count() {
        let mut catalog = FakeCatalog::with_features(vec![]);
        catalog.fail_download = true;
        let service = service_with(catalog).await;

        let mut tile = service
            .store()
            .insert_tile(NewTile {
                product: Product::Sentinel2,
                tile_id: "tile-2".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(),
                boundary: vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]],
                catalog_data: serde_json::to_value(polygon_feature("tile-2")).unwrap(),
                to_be_downloaded: true,
                collection_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(service.download(&mut tile, &source()).await.is_err());

        // Attempt counter and start time persist; completion fields do not.
        let persisted = service.store().get_tile(tile.id).await.unwrap();
        assert_eq!(persisted.dl_attempts, 1);
        assert!(persisted.dl_start_time.is_some());
        assert!(!persisted.is_downloaded);
        assert!(persisted.dl_end_time.is_none());
    }

    #[tokio::test]
    async fn test_fetch_target_images_requires_extracted_path() {
        let service = service_with(FakeCatalog::with_features(vec![])).await;

        let tile = service
            .store()
            .insert_tile(NewTile {
                product: Product::Sentinel2,
                tile_id: "tile-3".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(),
                boundary: vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]],
                catalog_data: serde_json::json!({}),
                to_be_downloaded: true,
                collection_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(matches!(
            service.fetch_target_images(&tile, &source()),
            Err(IngestError::MissingExtractedPath(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_target_images_sentinel1_unimplemented() {
        let service = service_with(FakeCatalog::with_features(vec![])).await;

        let mut tile = service
            .store()
            .insert_tile(NewTile {
                product: Product::Sentinel1,
                tile_id: "tile-4".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(),
                boundary: vec![[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]],
                catalog_data: serde_json::json!({}),
                to_be_downloaded: true,
                collection_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        tile.extracted_path = Some(std::env::temp_dir());

        assert!(matches!(
            service.fetch_target_images(&tile, &source()),
            Err(IngestError::Unimplemented(Product::Sentinel1))
        ));
    }
}
