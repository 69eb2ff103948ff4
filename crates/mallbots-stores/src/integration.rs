//! Wire schema for the events this context publishes.
//!
//! Consumers subscribe per channel: one channel per aggregate type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel carrying store integration events.
pub const STORE_CHANNEL: &str = "store";
/// Channel carrying product integration events.
pub const PRODUCT_CHANNEL: &str = "product";

/// Wire name for [`StoreCreated`].
pub const STORE_CREATED: &str = "storesapi.StoreCreated";
/// Wire name for [`StoreParticipationToggled`].
pub const STORE_PARTICIPATION_TOGGLED: &str = "storesapi.StoreParticipationToggled";
/// Wire name for [`StoreRebranded`].
pub const STORE_REBRANDED: &str = "storesapi.StoreRebranded";
/// Wire name for [`ProductAdded`].
pub const PRODUCT_ADDED: &str = "storesapi.ProductAdded";
/// Wire name for [`ProductRebranded`].
pub const PRODUCT_REBRANDED: &str = "storesapi.ProductRebranded";
/// Wire name for a [`ProductPriceChanged`] raising the price.
pub const PRODUCT_PRICE_INCREASED: &str = "storesapi.ProductPriceIncreased";
/// Wire name for a [`ProductPriceChanged`] lowering the price.
pub const PRODUCT_PRICE_DECREASED: &str = "storesapi.ProductPriceDecreased";
/// Wire name for [`ProductRemoved`].
pub const PRODUCT_REMOVED: &str = "storesapi.ProductRemoved";

/// A store was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCreated {
    pub id: Uuid,
    pub name: String,
    pub location: String,
}

/// A store's participation was switched on or off.
///
/// Enabling and disabling share this one wire kind; only the flag tells
/// them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreParticipationToggled {
    pub id: Uuid,
    pub participating: bool,
}

/// A store was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRebranded {
    pub id: Uuid,
    pub name: String,
}

/// A product was added to a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAdded {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: f64,
}

/// A product was renamed or redescribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRebranded {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// A product's price moved by `delta`. The wire name carries the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceChanged {
    pub id: Uuid,
    pub delta: f64,
}

/// A product was removed from its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRemoved {
    pub id: Uuid,
}
