//! Command handlers for the Stores & Catalog context.
//!
//! Each handler loads or creates an aggregate, applies the command, persists
//! the new state through the scope's repositories and hands the recorded
//! events to the scope's dispatcher. Handlers never commit; the unit of work
//! that owns the scope does.

use mallbots_core::aggregate::AggregateRoot;
use mallbots_core::command::Command;
use mallbots_core::error::DomainError;
use mallbots_core::event::DomainEvent;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::scope::StoresScope;
use crate::domain::aggregates::{CatalogProduct, MallStore, NewProduct};
use crate::domain::commands::{
    AddProduct, CreateStore, DecreaseProductPrice, DisableParticipation, EnableParticipation,
    IncreaseProductPrice, RebrandProduct, RebrandStore, RemoveProduct,
};
use crate::domain::events::StoresEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct StoresCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// The domain events recorded and dispatched.
    pub events: Vec<StoresEvent>,
}

impl StoresCommandResult {
    /// Identifiers of the dispatched events, in order.
    #[must_use]
    pub fn event_ids(&self) -> Vec<Uuid> {
        self.events.iter().map(|e| e.metadata().event_id).collect()
    }
}

async fn relay<A>(scope: &StoresScope, aggregate: &mut A) -> Result<StoresCommandResult, DomainError>
where
    A: AggregateRoot<Event = StoresEvent>,
{
    let events = aggregate.take_uncommitted_events();
    scope.dispatcher.dispatch(&events).await?;
    info!(
        aggregate_id = %aggregate.aggregate_id(),
        events = events.len(),
        "domain events relayed"
    );
    Ok(StoresCommandResult {
        aggregate_id: aggregate.aggregate_id(),
        events,
    })
}

async fn load_store(scope: &StoresScope, store_id: Uuid) -> Result<MallStore, DomainError> {
    scope
        .stores
        .find(store_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(store_id))
}

async fn load_product(
    scope: &StoresScope,
    product_id: Uuid,
) -> Result<CatalogProduct, DomainError> {
    scope
        .catalog
        .find(product_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(product_id))
}

/// Handles the `CreateStore` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or location, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(store_id = %command.store_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_create_store(
    command: &CreateStore,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut store = MallStore::create(
        command.store_id,
        &command.name,
        &command.location,
        command.correlation_id,
        scope.clock.as_ref(),
    )?;
    scope.stores.insert(&store).await?;
    relay(scope, &mut store).await
}

/// Handles the `EnableParticipation` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown store,
/// `DomainError::InvariantViolation` if it already participates, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(store_id = %command.store_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_enable_participation(
    command: &EnableParticipation,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut store = load_store(scope, command.store_id).await?;
    store.enable_participation(command.correlation_id, scope.clock.as_ref())?;
    scope.stores.update(&store).await?;
    relay(scope, &mut store).await
}

/// Handles the `DisableParticipation` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown store,
/// `DomainError::InvariantViolation` if it does not participate, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(store_id = %command.store_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_disable_participation(
    command: &DisableParticipation,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut store = load_store(scope, command.store_id).await?;
    store.disable_participation(command.correlation_id, scope.clock.as_ref())?;
    scope.stores.update(&store).await?;
    relay(scope, &mut store).await
}

/// Handles the `RebrandStore` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown store,
/// `DomainError::Validation` for a blank name, and any persistence or
/// dispatch failure.
#[instrument(skip_all, fields(store_id = %command.store_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_rebrand_store(
    command: &RebrandStore,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut store = load_store(scope, command.store_id).await?;
    store.rebrand(&command.name, command.correlation_id, scope.clock.as_ref())?;
    scope.stores.update(&store).await?;
    relay(scope, &mut store).await
}

/// Handles the `AddProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the store does not exist,
/// `DomainError::Validation` for a blank name or invalid price, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(product_id = %command.product_id, store_id = %command.store_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_add_product(
    command: &AddProduct,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let new_product = NewProduct {
        store_id: command.store_id,
        name: &command.name,
        description: &command.description,
        sku: &command.sku,
        price: command.price,
    };
    let mut product = CatalogProduct::add(
        command.product_id,
        &new_product,
        command.correlation_id,
        scope.clock.as_ref(),
    )?;
    load_store(scope, command.store_id).await?;
    scope.catalog.insert(&product).await?;
    relay(scope, &mut product).await
}

/// Handles the `RebrandProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown product,
/// `DomainError::Validation` for a blank name, and any persistence or
/// dispatch failure.
#[instrument(skip_all, fields(product_id = %command.product_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_rebrand_product(
    command: &RebrandProduct,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut product = load_product(scope, command.product_id).await?;
    product.rebrand(
        &command.name,
        &command.description,
        command.correlation_id,
        scope.clock.as_ref(),
    )?;
    scope.catalog.update(&product).await?;
    relay(scope, &mut product).await
}

/// Handles the `IncreaseProductPrice` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown product,
/// `DomainError::Validation` for a non-positive delta, and any persistence or
/// dispatch failure.
#[instrument(skip_all, fields(product_id = %command.product_id, delta = command.delta, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_increase_product_price(
    command: &IncreaseProductPrice,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut product = load_product(scope, command.product_id).await?;
    product.increase_price(command.delta, command.correlation_id, scope.clock.as_ref())?;
    scope.catalog.update(&product).await?;
    relay(scope, &mut product).await
}

/// Handles the `DecreaseProductPrice` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown product,
/// `DomainError::Validation` for a non-positive delta,
/// `DomainError::InvariantViolation` if the price would go negative, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(product_id = %command.product_id, delta = command.delta, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_decrease_product_price(
    command: &DecreaseProductPrice,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut product = load_product(scope, command.product_id).await?;
    product.decrease_price(command.delta, command.correlation_id, scope.clock.as_ref())?;
    scope.catalog.update(&product).await?;
    relay(scope, &mut product).await
}

/// Handles the `RemoveProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown product, and any
/// persistence or dispatch failure.
#[instrument(skip_all, fields(product_id = %command.product_id, command = command.command_type(), correlation_id = %command.correlation_id()))]
pub async fn handle_remove_product(
    command: &RemoveProduct,
    scope: &StoresScope,
) -> Result<StoresCommandResult, DomainError> {
    let mut product = load_product(scope, command.product_id).await?;
    product.remove(command.correlation_id, scope.clock.as_ref());
    scope.catalog.delete(product.id).await?;
    relay(scope, &mut product).await
}
