//! Normalized catalog result types.

use chrono::NaiveDate;

/// Processing level of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    /// Top-of-atmosphere reflectance (Level-1C).
    Level1C,
    /// Atmospherically corrected surface reflectance (Level-2A).
    Level2A,
}

impl ProductType {
    /// Whether this product has been atmospherically corrected.
    pub fn is_atmospherically_corrected(&self) -> bool {
        matches!(self, ProductType::Level2A)
    }
}

/// One scene from a catalog query, with the links needed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneResult {
    /// Catalog identifier (UUID).
    pub id: String,
    /// Product title, e.g. `S2A_MSIL2A_20200105T110441_...`.
    pub title: String,
    /// Date the scene was acquired.
    pub acquisition_date: NaiveDate,
    /// Processing level, derived from the product title.
    pub product_type: ProductType,
    /// Quicklook preview URL.
    pub preview_url: String,
    /// Full product archive URL.
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atmospheric_correction_flag() {
        assert!(ProductType::Level2A.is_atmospherically_corrected());
        assert!(!ProductType::Level1C.is_atmospherically_corrected());
    }
}
