//! Tile and collection-request persistence using SQLite with sqlx.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use curator_common::Geometry;

use crate::error::{StoreError, StoreResult};
use crate::models::{CollectionRequest, NewTile, TileRecord};

/// Manages tile and collection-request persistence.
pub struct TileStore {
    pool: SqlitePool,
}

type TileRow = (
    i64,            // id
    String,         // product
    String,         // tile_id
    String,         // date
    String,         // boundary (JSON ring)
    String,         // catalog_data (JSON)
    bool,           // to_be_downloaded
    i64,            // dl_attempts
    Option<String>, // dl_start_time
    Option<String>, // dl_end_time
    bool,           // is_downloaded
    Option<String>, // extracted_path
    String,         // collection_id
);

const TILE_COLUMNS: &str = "id, product, tile_id, date, boundary, catalog_data, \
     to_be_downloaded, dl_attempts, dl_start_time, dl_end_time, \
     is_downloaded, extracted_path, collection_id";

impl TileStore {
    /// Open or create the store database at the given path.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::create_schema(&pool).await?;

        info!(path = %path.display(), "Opened tile store database");

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::create_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn create_schema(pool: &SqlitePool) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collection_requests (
                id TEXT PRIMARY KEY,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                extent TEXT NOT NULL,
                is_accepted BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS satellite_tiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product TEXT NOT NULL,
                tile_id TEXT NOT NULL,
                date TEXT NOT NULL,
                boundary TEXT NOT NULL,
                catalog_data TEXT NOT NULL,
                to_be_downloaded BOOLEAN NOT NULL DEFAULT 1,
                dl_attempts INTEGER NOT NULL DEFAULT 0,
                dl_start_time TEXT,
                dl_end_time TEXT,
                is_downloaded BOOLEAN NOT NULL DEFAULT 0,
                extracted_path TEXT,
                collection_id TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        // tile_id is intentionally NOT unique: re-ingesting the same external
        // identifier inserts a new row.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_tiles_tile_id ON satellite_tiles(tile_id)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_tiles_collection ON satellite_tiles(collection_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Persist a new collection request, assigning its identifier.
    pub async fn insert_request(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        extent: &Geometry,
        is_accepted: bool,
    ) -> StoreResult<CollectionRequest> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO collection_requests (id, start_date, end_date, extent, is_accepted, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(start_date.to_string())
        .bind(end_date.to_string())
        .bind(serde_json::to_string(extent)?)
        .bind(is_accepted)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(id = %id, "Created collection request");

        Ok(CollectionRequest {
            id,
            start_date,
            end_date,
            extent: extent.clone(),
            is_accepted,
            created_at,
        })
    }

    /// Fetch a collection request by id.
    pub async fn get_request(&self, id: Uuid) -> StoreResult<CollectionRequest> {
        let row: Option<(String, String, String, bool, String)> = sqlx::query_as(
            "SELECT start_date, end_date, extent, is_accepted, created_at \
             FROM collection_requests WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let (start_date, end_date, extent, is_accepted, created_at) =
            row.ok_or(StoreError::RequestNotFound(id))?;

        Ok(CollectionRequest {
            id,
            start_date: parse_date(&start_date)?,
            end_date: parse_date(&end_date)?,
            extent: serde_json::from_str(&extent)?,
            is_accepted,
            created_at: parse_datetime(&created_at)?,
        })
    }

    /// Insert a tile record mapped from a catalog feature.
    pub async fn insert_tile(&self, tile: NewTile) -> StoreResult<TileRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO satellite_tiles
                (product, tile_id, date, boundary, catalog_data, to_be_downloaded, collection_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tile.product.as_str())
        .bind(&tile.tile_id)
        .bind(tile.date.to_string())
        .bind(serde_json::to_string(&tile.boundary)?)
        .bind(serde_json::to_string(&tile.catalog_data)?)
        .bind(tile.to_be_downloaded)
        .bind(tile.collection_id.to_string())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = id, tile_id = %tile.tile_id, "Inserted satellite tile");

        Ok(TileRecord {
            id,
            product: tile.product,
            tile_id: tile.tile_id,
            date: tile.date,
            boundary: tile.boundary,
            catalog_data: tile.catalog_data,
            to_be_downloaded: tile.to_be_downloaded,
            dl_attempts: 0,
            dl_start_time: None,
            dl_end_time: None,
            is_downloaded: false,
            extracted_path: None,
            collection_id: tile.collection_id,
        })
    }

    /// Fetch a tile by row id.
    pub async fn get_tile(&self, id: i64) -> StoreResult<TileRecord> {
        let row: Option<TileRow> = sqlx::query_as(&format!(
            "SELECT {TILE_COLUMNS} FROM satellite_tiles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::TileNotFound(id)).and_then(row_to_tile)
    }

    /// Write a tile's mutable bookkeeping fields back to the database.
    pub async fn save_tile(&self, tile: &TileRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE satellite_tiles
            SET to_be_downloaded = ?, dl_attempts = ?, dl_start_time = ?,
                dl_end_time = ?, is_downloaded = ?, extracted_path = ?
            WHERE id = ?
            "#,
        )
        .bind(tile.to_be_downloaded)
        .bind(tile.dl_attempts as i64)
        .bind(tile.dl_start_time.map(|t| t.to_rfc3339()))
        .bind(tile.dl_end_time.map(|t| t.to_rfc3339()))
        .bind(tile.is_downloaded)
        .bind(
            tile.extracted_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )
        .bind(tile.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All tiles persisted for one collection request.
    pub async fn tiles_for_collection(&self, collection_id: Uuid) -> StoreResult<Vec<TileRecord>> {
        let rows: Vec<TileRow> = sqlx::query_as(&format!(
            "SELECT {TILE_COLUMNS} FROM satellite_tiles WHERE collection_id = ? ORDER BY id ASC"
        ))
        .bind(collection_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_tile).collect()
    }
}

fn parse_date(s: &str) -> StoreResult<NaiveDate> {
    s.parse()
        .map_err(|_| StoreError::Corrupt(format!("date column: {}", s)))
}

fn parse_datetime(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("datetime column: {}", s)))
}

fn row_to_tile(row: TileRow) -> StoreResult<TileRecord> {
    let (
        id,
        product,
        tile_id,
        date,
        boundary,
        catalog_data,
        to_be_downloaded,
        dl_attempts,
        dl_start_time,
        dl_end_time,
        is_downloaded,
        extracted_path,
        collection_id,
    ) = row;

    Ok(TileRecord {
        id,
        product: product
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("product column: {}", product)))?,
        tile_id,
        date: parse_date(&date)?,
        boundary: serde_json::from_str(&boundary)?,
        catalog_data: serde_json::from_str(&catalog_data)?,
        to_be_downloaded,
        dl_attempts: dl_attempts as u32,
        dl_start_time: dl_start_time.as_deref().map(parse_datetime).transpose()?,
        dl_end_time: dl_end_time.as_deref().map(parse_datetime).transpose()?,
        is_downloaded,
        extracted_path: extracted_path.map(PathBuf::from),
        collection_id: collection_id
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("collection_id column: {}", collection_id)))?,
    })
}
