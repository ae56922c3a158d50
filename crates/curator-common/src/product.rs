//! Satellite product families known to the curator.

use serde::{Deserialize, Serialize};

use crate::error::CuratorError;

/// A satellite product family.
///
/// Landsat variants are catalogued but have no provider product code yet;
/// searching for them fails with [`CuratorError::UnsupportedProduct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    Sentinel1,
    Sentinel2,
    Sentinel3,
    Landsat8,
    Landsat9,
}

impl Product {
    /// The provider-specific product-type code used in catalog searches.
    pub fn provider_code(&self) -> Result<&'static str, CuratorError> {
        match self {
            Product::Sentinel1 => Ok("S1_SAR_RAW"),
            Product::Sentinel2 => Ok("S2_MSI_L1C"),
            Product::Sentinel3 => Ok("S3_EFR"),
            Product::Landsat8 | Product::Landsat9 => {
                Err(CuratorError::UnsupportedProduct(*self))
            }
        }
    }

    /// Stable identifier used for persistence and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Sentinel1 => "sentinel-1",
            Product::Sentinel2 => "sentinel-2",
            Product::Sentinel3 => "sentinel-3",
            Product::Landsat8 => "landsat-8",
            Product::Landsat9 => "landsat-9",
        }
    }
}

impl std::str::FromStr for Product {
    type Err = CuratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sentinel-1" => Ok(Product::Sentinel1),
            "sentinel-2" => Ok(Product::Sentinel2),
            "sentinel-3" => Ok(Product::Sentinel3),
            "landsat-8" => Ok(Product::Landsat8),
            "landsat-9" => Ok(Product::Landsat9),
            other => Err(CuratorError::UnknownProductName(other.to_string())),
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes() {
        assert_eq!(Product::Sentinel1.provider_code().unwrap(), "S1_SAR_RAW");
        assert_eq!(Product::Sentinel2.provider_code().unwrap(), "S2_MSI_L1C");
        assert_eq!(Product::Sentinel3.provider_code().unwrap(), "S3_EFR");
    }

    #[test]
    fn test_landsat_has_no_provider_code() {
        assert!(matches!(
            Product::Landsat8.provider_code(),
            Err(CuratorError::UnsupportedProduct(Product::Landsat8))
        ));
    }

    #[test]
    fn test_roundtrip_names() {
        for product in [
            Product::Sentinel1,
            Product::Sentinel2,
            Product::Sentinel3,
            Product::Landsat8,
            Product::Landsat9,
        ] {
            let parsed: Product = product.as_str().parse().unwrap();
            assert_eq!(parsed, product);
        }
    }
}
