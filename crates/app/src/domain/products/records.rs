//! Product Records

use jiff::Timestamp;
use storefront::{bundles::BundlePricing, catalog::CatalogProduct};

pub use storefront::catalog::ProductUuid;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub image: Option<String>,
    pub base_price: u64,
    pub bundle_pricing: BundlePricing,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl From<ProductRecord> for CatalogProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            image: record.image,
            is_active: record.is_active,
            bundle_pricing: record.bundle_pricing,
        }
    }
}
