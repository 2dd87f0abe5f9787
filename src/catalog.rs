//! Catalog

use rustc_hash::FxHashMap;

use crate::{bundles::BundlePricing, uuids::TypedUuid};

/// Product Uuid
pub type ProductUuid = TypedUuid<CatalogProduct>;

/// The parts of a product settlement depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub bundle_pricing: BundlePricing,
}

/// Read access to live product state.
pub trait Catalog {
    /// Look up a product by uuid.
    fn product(&self, uuid: ProductUuid) -> Option<&CatalogProduct>;

    /// Whether the product exists and is active.
    fn is_available(&self, uuid: ProductUuid) -> bool {
        self.product(uuid).is_some_and(|product| product.is_active)
    }
}

/// In-memory catalog keyed by product uuid.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    products: FxHashMap<ProductUuid, CatalogProduct>,
}

impl ProductIndex {
    /// Add or replace a product.
    pub fn insert(&mut self, product: CatalogProduct) {
        self.products.insert(product.uuid, product);
    }
}

impl Catalog for ProductIndex {
    fn product(&self, uuid: ProductUuid) -> Option<&CatalogProduct> {
        self.products.get(&uuid)
    }
}

impl FromIterator<CatalogProduct> for ProductIndex {
    fn from_iter<T: IntoIterator<Item = CatalogProduct>>(iter: T) -> Self {
        Self {
            products: iter
                .into_iter()
                .map(|product| (product.uuid, product))
                .collect(),
        }
    }
}
