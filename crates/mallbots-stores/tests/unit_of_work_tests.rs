//! End-to-end behaviour of commands and queries running inside scoped units
//! of work, with integration events relayed to a test publisher.

use std::sync::Arc;

use mallbots_core::dispatcher::HandlerRegistry;
use mallbots_core::error::DomainError;
use mallbots_core::publisher::MessagePublisher;
use mallbots_core::scope::run_scoped;
use mallbots_stores::application::command_handlers::{
    handle_add_product, handle_create_store, handle_decrease_product_price,
    handle_disable_participation, handle_enable_participation, handle_increase_product_price,
};
use mallbots_stores::application::integration_handlers::{
    IntegrationEventHandlers, register_integration_event_handlers,
};
use mallbots_stores::application::query_handlers::{get_product, get_store, get_stores};
use mallbots_stores::application::scope::StoresScope;
use mallbots_stores::domain::commands::{
    AddProduct, CreateStore, DecreaseProductPrice, DisableParticipation, EnableParticipation,
    IncreaseProductPrice,
};
use mallbots_stores::integration::{
    PRODUCT_CHANNEL, PRODUCT_PRICE_INCREASED, STORE_CHANNEL, STORE_CREATED,
    STORE_PARTICIPATION_TOGGLED,
};
use mallbots_stores::memory::{MemoryDatabase, MemoryScopeProvider};
use mallbots_test_support::{FailingPublisher, FixedClock, RecordingPublisher};
use serde_json::json;
use uuid::Uuid;

fn provider(db: &MemoryDatabase, publisher: Arc<dyn MessagePublisher>) -> MemoryScopeProvider {
    let handlers = Arc::new(IntegrationEventHandlers::new(publisher));
    let registry =
        register_integration_event_handlers(HandlerRegistry::builder(), handlers).build();
    MemoryScopeProvider::new(db.clone(), registry, Arc::new(FixedClock::default()))
}

fn create_store(name: &str) -> CreateStore {
    CreateStore {
        correlation_id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        name: name.to_owned(),
        location: "NY".to_owned(),
    }
}

fn add_product(store_id: Uuid, price: f64) -> AddProduct {
    AddProduct {
        correlation_id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        store_id,
        name: "Widget".to_owned(),
        description: "desc".to_owned(),
        sku: "SKU1".to_owned(),
        price,
    }
}

async fn create_then_panic(command: CreateStore, scope: StoresScope) -> Result<(), DomainError> {
    handle_create_store(&command, &scope).await?;
    panic!("handler blew up");
}

async fn seed_store(scopes: &MemoryScopeProvider, name: &str) -> Uuid {
    let command = create_store(name);
    run_scoped(scopes, |scope| async move {
        handle_create_store(&command, &scope).await
    })
    .await
    .unwrap()
    .aggregate_id
}

#[tokio::test]
async fn test_created_store_is_readable_and_announced() {
    // Arrange
    let db = MemoryDatabase::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let scopes = provider(&db, publisher.clone());

    // Act
    let store_id = seed_store(&scopes, "Acme").await;
    let view = run_scoped(&scopes, |scope| async move { get_store(store_id, &scope).await })
        .await
        .unwrap();

    // Assert
    assert_eq!(view.name, "Acme");
    assert_eq!(view.location, "NY");
    assert!(!view.participating);
    let published = publisher.published_on(STORE_CHANNEL);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].name, STORE_CREATED);
    assert_eq!(
        published[0].payload,
        json!({"id": store_id, "name": "Acme", "location": "NY"})
    );
}

#[tokio::test]
async fn test_participation_toggles_publish_in_order() {
    // Arrange
    let db = MemoryDatabase::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let scopes = provider(&db, publisher.clone());
    let store_id = seed_store(&scopes, "Acme").await;
    let enable = EnableParticipation {
        correlation_id: Uuid::new_v4(),
        store_id,
    };
    let disable = DisableParticipation {
        correlation_id: Uuid::new_v4(),
        store_id,
    };

    // Act
    run_scoped(&scopes, |scope| async move {
        handle_enable_participation(&enable, &scope).await
    })
    .await
    .unwrap();
    run_scoped(&scopes, |scope| async move {
        handle_disable_participation(&disable, &scope).await
    })
    .await
    .unwrap();

    // Assert
    let toggles: Vec<_> = publisher
        .published_on(STORE_CHANNEL)
        .into_iter()
        .filter(|e| e.name == STORE_PARTICIPATION_TOGGLED)
        .collect();
    assert_eq!(toggles.len(), 2);
    assert_eq!(
        toggles[0].payload,
        json!({"id": store_id, "participating": true})
    );
    assert_eq!(
        toggles[1].payload,
        json!({"id": store_id, "participating": false})
    );
}

#[tokio::test]
async fn test_rejected_price_decrease_leaves_price_unchanged() {
    // Arrange
    let db = MemoryDatabase::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let scopes = provider(&db, publisher.clone());
    let store_id = seed_store(&scopes, "Acme").await;
    let added = add_product(store_id, 100.0);
    let product_id = added.product_id;
    run_scoped(&scopes, |scope| async move {
        handle_add_product(&added, &scope).await
    })
    .await
    .unwrap();
    let increase = IncreaseProductPrice {
        correlation_id: Uuid::new_v4(),
        product_id,
        delta: 50.0,
    };
    run_scoped(&scopes, |scope| async move {
        handle_increase_product_price(&increase, &scope).await
    })
    .await
    .unwrap();
    let decrease = DecreaseProductPrice {
        correlation_id: Uuid::new_v4(),
        product_id,
        delta: 200.0,
    };
    let published_before = publisher.published().len();

    // Act
    let result = run_scoped(&scopes, |scope| async move {
        handle_decrease_product_price(&decrease, &scope).await
    })
    .await;

    // Assert
    match result {
        Err(DomainError::InvariantViolation(_)) => {}
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
    let product = run_scoped(&scopes, |scope| async move {
        get_product(product_id, &scope).await
    })
    .await
    .unwrap();
    assert!((product.price - 150.0).abs() < f64::EPSILON);
    assert_eq!(publisher.published().len(), published_before);
    let increases: Vec<_> = publisher
        .published_on(PRODUCT_CHANNEL)
        .into_iter()
        .filter(|e| e.name == PRODUCT_PRICE_INCREASED)
        .collect();
    assert_eq!(increases.len(), 1);
    assert_eq!(increases[0].payload["delta"], json!(50.0));
}

#[tokio::test]
async fn test_broker_outage_rolls_back_the_write() {
    // Arrange
    let db = MemoryDatabase::new();
    let healthy = provider(&db, Arc::new(RecordingPublisher::new()));
    let store_id = seed_store(&healthy, "Acme").await;
    let outage = provider(&db, Arc::new(FailingPublisher));
    let added = add_product(store_id, 10.0);
    let product_id = added.product_id;

    // Act
    let result = run_scoped(&outage, |scope| async move {
        handle_add_product(&added, &scope).await
    })
    .await;

    // Assert
    match result {
        Err(DomainError::Infrastructure(msg)) => assert_eq!(msg, "broker unavailable"),
        other => panic!("expected Infrastructure, got {other:?}"),
    }
    let lookup = run_scoped(&healthy, |scope| async move {
        get_product(product_id, &scope).await
    })
    .await;
    match lookup {
        Err(DomainError::AggregateNotFound(id)) => assert_eq!(id, product_id),
        other => panic!("expected AggregateNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_each_event_is_published_exactly_once() {
    // Arrange
    let db = MemoryDatabase::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let scopes = provider(&db, publisher.clone());

    // Act
    let store_id = seed_store(&scopes, "Acme").await;
    let added = add_product(store_id, 5.0);
    let result = run_scoped(&scopes, |scope| async move {
        handle_add_product(&added, &scope).await
    })
    .await
    .unwrap();

    // Assert
    let published = publisher.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].0, PRODUCT_CHANNEL);
    assert_eq!(published[1].1.id, result.event_ids()[0]);
}

#[tokio::test]
async fn test_failed_work_discards_every_write_in_the_scope() {
    // Arrange
    let db = MemoryDatabase::new();
    let scopes = provider(&db, Arc::new(RecordingPublisher::new()));
    let first = create_store("Acme");
    let second = CreateStore {
        name: "   ".to_owned(),
        ..create_store("ignored")
    };
    let first_id = first.store_id;

    // Act
    let result = run_scoped(&scopes, |scope| async move {
        handle_create_store(&first, &scope).await?;
        handle_create_store(&second, &scope).await
    })
    .await;

    // Assert
    assert!(matches!(result, Err(DomainError::Validation(_))));
    let lookup = run_scoped(&scopes, |scope| async move {
        get_store(first_id, &scope).await
    })
    .await;
    assert!(matches!(lookup, Err(DomainError::AggregateNotFound(_))));
}

#[tokio::test]
async fn test_concurrent_scopes_are_isolated() {
    // Arrange
    let db = MemoryDatabase::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let scopes = provider(&db, publisher.clone());
    let acme = create_store("Acme");
    let zed = create_store("Zed");

    // Act
    let (a, z) = tokio::join!(
        run_scoped(&scopes, |scope| async move {
            handle_create_store(&acme, &scope).await
        }),
        run_scoped(&scopes, |scope| async move {
            handle_create_store(&zed, &scope).await
        }),
    );

    // Assert
    a.unwrap();
    z.unwrap();
    let stores = run_scoped(&scopes, |scope| async move { get_stores(&scope).await })
        .await
        .unwrap();
    let names: Vec<&str> = stores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Acme", "Zed"]);
    assert_eq!(publisher.published_on(STORE_CHANNEL).len(), 2);
}

#[tokio::test]
async fn test_panicking_work_rolls_back_and_resumes_panic() {
    // Arrange
    let db = MemoryDatabase::new();
    let scopes = Arc::new(provider(&db, Arc::new(RecordingPublisher::new())));
    let command = create_store("Acme");
    let store_id = command.store_id;
    let task_scopes = Arc::clone(&scopes);

    // Act
    let joined = tokio::spawn(async move {
        run_scoped(task_scopes.as_ref(), |scope| create_then_panic(command, scope)).await
    })
    .await;

    // Assert
    let err = joined.unwrap_err();
    assert!(err.is_panic());
    let lookup = run_scoped(scopes.as_ref(), |scope| async move {
        get_store(store_id, &scope).await
    })
    .await;
    assert!(matches!(lookup, Err(DomainError::AggregateNotFound(_))));
}
