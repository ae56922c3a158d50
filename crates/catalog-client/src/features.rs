//! GeoJSON feature collection types returned by catalog searches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use curator_common::Geometry;

/// A GeoJSON FeatureCollection as returned by the catalog search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Array of features.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Wrap a single feature, as the download path does when round-tripping
    /// a persisted tile payload through the gateway deserializer.
    pub fn single(feature: Feature) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: vec![feature],
        }
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// One catalog search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// External product identifier.
    pub id: String,

    /// Footprint of the product.
    pub geometry: Geometry,

    /// Provider-defined properties, kept verbatim.
    #[serde(default)]
    pub properties: Value,
}

impl Feature {
    /// Read a string property, if present.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// The URL this product can be downloaded from.
    ///
    /// The provider exposes it either as a top-level `downloadLink` or under
    /// `services.download.url`.
    pub fn download_url(&self) -> Option<&str> {
        self.property_str("downloadLink").or_else(|| {
            self.properties
                .get("services")?
                .get("download")?
                .get("url")?
                .as_str()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_feature() -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "id": "S2A_MSIL1C_20230107T063129",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[54.0, 24.0], [55.0, 24.0], [55.0, 25.0], [54.0, 24.0]]]
            },
            "properties": {
                "startTimeFromAscendingNode": "2023-01-07T06:31:29.024Z",
                "cloudCover": 12.5,
                "services": {"download": {"url": "https://catalog.example/dl/42"}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_download_url_from_services() {
        let feature = sample_feature();
        assert_eq!(feature.download_url(), Some("https://catalog.example/dl/42"));
    }

    #[test]
    fn test_download_url_prefers_download_link() {
        let mut feature = sample_feature();
        feature.properties["downloadLink"] = json!("https://catalog.example/direct");
        assert_eq!(feature.download_url(), Some("https://catalog.example/direct"));
    }

    #[test]
    fn test_collection_roundtrip() {
        let collection = FeatureCollection::single(sample_feature());
        let json = serde_json::to_string(&collection).unwrap();
        let parsed: FeatureCollection = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.type_, "FeatureCollection");
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].id, "S2A_MSIL1C_20230107T063129");
    }
}
