//! Domain events for the Stores & Catalog context.

use mallbots_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event name for [`StoreCreated`].
pub const STORE_CREATED_EVENT: &str = "stores.store_created";
/// Event name for [`StoreParticipationEnabled`].
pub const STORE_PARTICIPATION_ENABLED_EVENT: &str = "stores.store_participation_enabled";
/// Event name for [`StoreParticipationDisabled`].
pub const STORE_PARTICIPATION_DISABLED_EVENT: &str = "stores.store_participation_disabled";
/// Event name for [`StoreRebranded`].
pub const STORE_REBRANDED_EVENT: &str = "stores.store_rebranded";
/// Event name for [`ProductAdded`].
pub const PRODUCT_ADDED_EVENT: &str = "stores.product_added";
/// Event name for [`ProductRebranded`].
pub const PRODUCT_REBRANDED_EVENT: &str = "stores.product_rebranded";
/// Event name for [`ProductPriceIncreased`].
pub const PRODUCT_PRICE_INCREASED_EVENT: &str = "stores.product_price_increased";
/// Event name for [`ProductPriceDecreased`].
pub const PRODUCT_PRICE_DECREASED_EVENT: &str = "stores.product_price_decreased";
/// Event name for [`ProductRemoved`].
pub const PRODUCT_REMOVED_EVENT: &str = "stores.product_removed";

/// Every event name this context records.
pub const ALL_EVENTS: [&str; 9] = [
    STORE_CREATED_EVENT,
    STORE_PARTICIPATION_ENABLED_EVENT,
    STORE_PARTICIPATION_DISABLED_EVENT,
    STORE_REBRANDED_EVENT,
    PRODUCT_ADDED_EVENT,
    PRODUCT_REBRANDED_EVENT,
    PRODUCT_PRICE_INCREASED_EVENT,
    PRODUCT_PRICE_DECREASED_EVENT,
    PRODUCT_REMOVED_EVENT,
];

/// Emitted when a store is opened in the mall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCreated {
    /// The store identifier.
    pub store_id: Uuid,
    /// Display name.
    pub name: String,
    /// Location inside the mall.
    pub location: String,
}

/// Emitted when a store starts taking part in automated shopping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreParticipationEnabled {
    /// The store identifier.
    pub store_id: Uuid,
}

/// Emitted when a store stops taking part in automated shopping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreParticipationDisabled {
    /// The store identifier.
    pub store_id: Uuid,
}

/// Emitted when a store changes its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRebranded {
    /// The store identifier.
    pub store_id: Uuid,
    /// The new name.
    pub name: String,
}

/// Emitted when a product is added to a store's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAdded {
    /// The product identifier.
    pub product_id: Uuid,
    /// The owning store.
    pub store_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Initial price.
    pub price: f64,
}

/// Emitted when a product's name or description changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRebranded {
    /// The product identifier.
    pub product_id: Uuid,
    /// The new name.
    pub name: String,
    /// The new description.
    pub description: String,
}

/// Emitted when a product's price goes up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceIncreased {
    /// The product identifier.
    pub product_id: Uuid,
    /// Amount added to the price.
    pub delta: f64,
}

/// Emitted when a product's price goes down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPriceDecreased {
    /// The product identifier.
    pub product_id: Uuid,
    /// Amount taken off the price.
    pub delta: f64,
}

/// Emitted when a product is taken out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRemoved {
    /// The product identifier.
    pub product_id: Uuid,
}

/// Event payload variants for the Stores & Catalog context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoresEventKind {
    /// A store has been created.
    StoreCreated(StoreCreated),
    /// A store has started participating.
    StoreParticipationEnabled(StoreParticipationEnabled),
    /// A store has stopped participating.
    StoreParticipationDisabled(StoreParticipationDisabled),
    /// A store has been renamed.
    StoreRebranded(StoreRebranded),
    /// A product has been added.
    ProductAdded(ProductAdded),
    /// A product has been renamed or redescribed.
    ProductRebranded(ProductRebranded),
    /// A product's price has increased.
    ProductPriceIncreased(ProductPriceIncreased),
    /// A product's price has decreased.
    ProductPriceDecreased(ProductPriceDecreased),
    /// A product has been removed.
    ProductRemoved(ProductRemoved),
}

impl StoresEventKind {
    /// Returns the event name for this payload.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StoreCreated(_) => STORE_CREATED_EVENT,
            Self::StoreParticipationEnabled(_) => STORE_PARTICIPATION_ENABLED_EVENT,
            Self::StoreParticipationDisabled(_) => STORE_PARTICIPATION_DISABLED_EVENT,
            Self::StoreRebranded(_) => STORE_REBRANDED_EVENT,
            Self::ProductAdded(_) => PRODUCT_ADDED_EVENT,
            Self::ProductRebranded(_) => PRODUCT_REBRANDED_EVENT,
            Self::ProductPriceIncreased(_) => PRODUCT_PRICE_INCREASED_EVENT,
            Self::ProductPriceDecreased(_) => PRODUCT_PRICE_DECREASED_EVENT,
            Self::ProductRemoved(_) => PRODUCT_REMOVED_EVENT,
        }
    }
}

/// Domain event envelope for the Stores & Catalog context.
#[derive(Debug, Clone, PartialEq)]
pub struct StoresEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StoresEventKind,
}

impl DomainEvent for StoresEvent {
    fn event_name(&self) -> &'static str {
        self.kind.name()
    }

    fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.kind)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
