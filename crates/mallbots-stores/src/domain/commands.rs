//! Commands for the Stores & Catalog context.

use mallbots_core::command::Command;
use uuid::Uuid;

/// Command to open a new store.
#[derive(Debug, Clone)]
pub struct CreateStore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier assigned to the new store.
    pub store_id: Uuid,
    /// Display name.
    pub name: String,
    /// Location inside the mall.
    pub location: String,
}

/// Command to start a store's participation.
#[derive(Debug, Clone)]
pub struct EnableParticipation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: Uuid,
}

/// Command to stop a store's participation.
#[derive(Debug, Clone)]
pub struct DisableParticipation {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: Uuid,
}

/// Command to rename a store.
#[derive(Debug, Clone)]
pub struct RebrandStore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The store identifier.
    pub store_id: Uuid,
    /// The new name.
    pub name: String,
}

/// Command to add a product to a store's catalog.
#[derive(Debug, Clone)]
pub struct AddProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier assigned to the new product.
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

/// Command to rename and redescribe a product.
#[derive(Debug, Clone)]
pub struct RebrandProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
    /// The new name.
    pub name: String,
    /// The new description.
    pub description: String,
}

/// Command to raise a product's price.
#[derive(Debug, Clone)]
pub struct IncreaseProductPrice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
    /// Amount to add.
    pub delta: f64,
}

/// Command to lower a product's price.
#[derive(Debug, Clone)]
pub struct DecreaseProductPrice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
    /// Amount to take off.
    pub delta: f64,
}

/// Command to take a product out of its catalog.
#[derive(Debug, Clone)]
pub struct RemoveProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
}

macro_rules! impl_command {
    ($($command:ident => $name:literal),+ $(,)?) => {
        $(
            impl Command for $command {
                fn command_type(&self) -> &'static str {
                    $name
                }

                fn correlation_id(&self) -> Uuid {
                    self.correlation_id
                }
            }
        )+
    };
}

impl_command! {
    CreateStore => "stores.create_store",
    EnableParticipation => "stores.enable_participation",
    DisableParticipation => "stores.disable_participation",
    RebrandStore => "stores.rebrand_store",
    AddProduct => "stores.add_product",
    RebrandProduct => "stores.rebrand_product",
    IncreaseProductPrice => "stores.increase_product_price",
    DecreaseProductPrice => "stores.decrease_product_price",
    RemoveProduct => "stores.remove_product",
}
