//! Aggregate roots for the Stores & Catalog context.

use mallbots_core::aggregate::AggregateRoot;
use mallbots_core::clock::Clock;
use mallbots_core::error::DomainError;
use mallbots_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{
    ProductAdded, ProductPriceDecreased, ProductPriceIncreased, ProductRebranded, ProductRemoved,
    StoreCreated, StoreParticipationDisabled, StoreParticipationEnabled, StoreRebranded,
    StoresEvent, StoresEventKind,
};

fn new_event(
    aggregate_id: Uuid,
    kind: StoresEventKind,
    correlation_id: Uuid,
    clock: &dyn Clock,
) -> StoresEvent {
    StoresEvent {
        metadata: EventMetadata {
            event_id: Uuid::new_v4(),
            event_name: kind.name().to_owned(),
            aggregate_id,
            correlation_id,
            occurred_at: clock.now(),
        },
        kind,
    }
}

/// Rounding slack allowed when a decrease lands on zero.
const PRICE_TOLERANCE: f64 = 1e-9;

fn require_text(value: &str, what: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("the {what} cannot be blank")));
    }
    Ok(())
}

fn require_amount(value: f64, what: &str) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::Validation(format!("the {what} must be a finite number")));
    }
    Ok(())
}

/// A store in the mall.
#[derive(Debug, Clone)]
pub struct MallStore {
    /// Aggregate identifier.
    pub id: Uuid,
    name: String,
    location: String,
    participating: bool,
    /// Events recorded since the store was loaded.
    uncommitted_events: Vec<StoresEvent>,
}

impl MallStore {
    /// Opens a new store, producing a `StoreCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name or location is blank.
    pub fn create(
        id: Uuid,
        name: &str,
        location: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        require_text(name, "store name")?;
        require_text(location, "store location")?;

        let mut store = Self::restore(id, String::new(), String::new(), false);
        store.record(
            StoresEventKind::StoreCreated(StoreCreated {
                store_id: id,
                name: name.to_owned(),
                location: location.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(store)
    }

    /// Rebuilds a store from persisted state without recording events.
    #[must_use]
    pub fn restore(id: Uuid, name: String, location: String, participating: bool) -> Self {
        Self {
            id,
            name,
            location,
            participating,
            uncommitted_events: Vec::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location inside the mall.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether the store takes part in automated shopping.
    #[must_use]
    pub fn participating(&self) -> bool {
        self.participating
    }

    /// Starts participation, producing a `StoreParticipationEnabled` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` if the store already participates.
    pub fn enable_participation(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.participating {
            return Err(DomainError::InvariantViolation(format!(
                "store {} is already participating",
                self.id
            )));
        }
        self.record(
            StoresEventKind::StoreParticipationEnabled(StoreParticipationEnabled {
                store_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Stops participation, producing a `StoreParticipationDisabled` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` if the store is not participating.
    pub fn disable_participation(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.participating {
            return Err(DomainError::InvariantViolation(format!(
                "store {} is already not participating",
                self.id
            )));
        }
        self.record(
            StoresEventKind::StoreParticipationDisabled(StoreParticipationDisabled {
                store_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Renames the store, producing a `StoreRebranded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank.
    pub fn rebrand(
        &mut self,
        name: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_text(name, "store name")?;
        self.record(
            StoresEventKind::StoreRebranded(StoreRebranded {
                store_id: self.id,
                name: name.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    fn record(&mut self, kind: StoresEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = new_event(self.id, kind, correlation_id, clock);
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for MallStore {
    type Event = StoresEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            StoresEventKind::StoreCreated(payload) => {
                self.name.clone_from(&payload.name);
                self.location.clone_from(&payload.location);
                self.participating = false;
            }
            StoresEventKind::StoreParticipationEnabled(_) => self.participating = true,
            StoresEventKind::StoreParticipationDisabled(_) => self.participating = false,
            StoresEventKind::StoreRebranded(payload) => self.name.clone_from(&payload.name),
            _ => {}
        }
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

/// A product listed in a store's catalog.
///
/// The owning store is fixed at creation and the price never drops below zero.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    /// Aggregate identifier.
    pub id: Uuid,
    store_id: Uuid,
    name: String,
    description: String,
    sku: String,
    price: f64,
    uncommitted_events: Vec<StoresEvent>,
}

/// Fields supplied when adding a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct<'a> {
    /// The owning store.
    pub store_id: Uuid,
    /// Display name.
    pub name: &'a str,
    /// Free-form description.
    pub description: &'a str,
    /// Stock keeping unit.
    pub sku: &'a str,
    /// Initial price.
    pub price: f64,
}

impl CatalogProduct {
    /// Adds a product to a catalog, producing a `ProductAdded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or the price is
    /// negative or not a finite number.
    pub fn add(
        id: Uuid,
        product: &NewProduct<'_>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        require_text(product.name, "product name")?;
        require_amount(product.price, "product price")?;
        if product.price < 0.0 {
            return Err(DomainError::Validation(
                "the product price cannot be negative".to_owned(),
            ));
        }

        let mut catalog_product = Self::restore(
            id,
            product.store_id,
            String::new(),
            String::new(),
            String::new(),
            0.0,
        );
        catalog_product.record(
            StoresEventKind::ProductAdded(ProductAdded {
                product_id: id,
                store_id: product.store_id,
                name: product.name.to_owned(),
                description: product.description.to_owned(),
                sku: product.sku.to_owned(),
                price: product.price,
            }),
            correlation_id,
            clock,
        );
        Ok(catalog_product)
    }

    /// Rebuilds a product from persisted state without recording events.
    #[must_use]
    pub fn restore(
        id: Uuid,
        store_id: Uuid,
        name: String,
        description: String,
        sku: String,
        price: f64,
    ) -> Self {
        Self {
            id,
            store_id,
            name,
            description,
            sku,
            price,
            uncommitted_events: Vec::new(),
        }
    }

    /// The owning store.
    #[must_use]
    pub fn store_id(&self) -> Uuid {
        self.store_id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stock keeping unit.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Current price.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Renames and redescribes the product, producing a `ProductRebranded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank.
    pub fn rebrand(
        &mut self,
        name: &str,
        description: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_text(name, "product name")?;
        self.record(
            StoresEventKind::ProductRebranded(ProductRebranded {
                product_id: self.id,
                name: name.to_owned(),
                description: description.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Raises the price by `delta`, producing a `ProductPriceIncreased` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `delta` is not a positive, finite
    /// number, and `DomainError::InvariantViolation` if the new price would
    /// overflow.
    pub fn increase_price(
        &mut self,
        delta: f64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_positive_delta(delta)?;
        if !(self.price + delta).is_finite() {
            return Err(DomainError::InvariantViolation(format!(
                "increasing product {} by {delta} would overflow its price",
                self.id
            )));
        }
        self.record(
            StoresEventKind::ProductPriceIncreased(ProductPriceIncreased {
                product_id: self.id,
                delta,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Lowers the price by `delta`, producing a `ProductPriceDecreased` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `delta` is not a positive, finite
    /// number, and `DomainError::InvariantViolation` if the price would go
    /// negative. A result within rounding slack of zero settles at zero.
    pub fn decrease_price(
        &mut self,
        delta: f64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_positive_delta(delta)?;
        if self.price - delta < -PRICE_TOLERANCE {
            return Err(DomainError::InvariantViolation(format!(
                "decreasing product {} by {delta} would make its price negative",
                self.id
            )));
        }
        self.record(
            StoresEventKind::ProductPriceDecreased(ProductPriceDecreased {
                product_id: self.id,
                delta,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Takes the product out of the catalog, producing a `ProductRemoved` event.
    pub fn remove(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            StoresEventKind::ProductRemoved(ProductRemoved {
                product_id: self.id,
            }),
            correlation_id,
            clock,
        );
    }

    fn record(&mut self, kind: StoresEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = new_event(self.id, kind, correlation_id, clock);
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

fn require_positive_delta(delta: f64) -> Result<(), DomainError> {
    require_amount(delta, "price change")?;
    if delta <= 0.0 {
        return Err(DomainError::Validation(
            "the price change must be greater than zero".to_owned(),
        ));
    }
    Ok(())
}

impl AggregateRoot for CatalogProduct {
    type Event = StoresEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            StoresEventKind::ProductAdded(payload) => {
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
                self.sku.clone_from(&payload.sku);
                self.price = payload.price;
            }
            StoresEventKind::ProductRebranded(payload) => {
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
            }
            StoresEventKind::ProductPriceIncreased(payload) => self.price += payload.delta,
            StoresEventKind::ProductPriceDecreased(payload) => {
                self.price = (self.price - payload.delta).max(0.0);
            }
            _ => {}
        }
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
