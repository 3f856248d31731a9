use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use checkout_engine::{
    db_types::{OrderId, OrderStatusType},
    events::{EventHandlers, EventHooks, EventProducers},
    order_objects::VerificationOutcome,
    test_utils::{prepare_test_env, random_db_path, FakeProvider},
    CartApi,
    CheckoutFlowApi,
    CheckoutOptions,
    ItemSource,
    OrderApi,
    SqliteDatabase,
    StoreApi,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct CheckoutWorld {
    pub system: Option<CheckoutSystem>,
}

/// What the hooks saw, in the order they saw it.
#[derive(Debug, Default)]
pub struct EventLog {
    pub finalized: Vec<OrderId>,
    pub annulled: Vec<(OrderId, OrderStatusType)>,
}

#[derive(Debug)]
pub struct CheckoutSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub other_db: SqliteDatabase,
    pub provider: FakeProvider,
    pub producers: EventProducers,
    pub flow: CheckoutFlowApi<SqliteDatabase, FakeProvider>,
    pub cart: CartApi<SqliteDatabase>,
    /// A cart API on `other_db`, a second connection pool, so it never shares a connection with the APIs above.
    pub other_session: CartApi<SqliteDatabase>,
    pub orders: OrderApi<SqliteDatabase>,
    pub store: StoreApi<SqliteDatabase>,
    pub events: Arc<Mutex<EventLog>>,
    pub users: HashMap<String, i64>,
    pub products: HashMap<String, i64>,
    pub addresses: HashMap<String, i64>,
    pub last_order: Option<OrderId>,
    pub last_error: Option<String>,
    pub last_outcome: Option<VerificationOutcome>,
}

impl CheckoutWorld {
    pub fn system(&mut self) -> &mut CheckoutSystem {
        self.system.as_mut().expect("Checkout system not initialised")
    }
}

impl CheckoutSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let other_db = SqliteDatabase::new_with_url(&url, 2).await.expect("Error creating second connection pool");
        let events = Arc::new(Mutex::new(EventLog::default()));
        let producers = start_event_log(events.clone());
        let provider = FakeProvider::new();
        let options = CheckoutOptions::default();
        Self {
            db_path: url,
            flow: CheckoutFlowApi::new(db.clone(), provider.clone(), producers.clone(), options),
            cart: CartApi::new(db.clone(), Default::default()),
            other_session: CartApi::new(other_db.clone(), Default::default()),
            other_db,
            orders: OrderApi::new(db.clone()),
            store: StoreApi::new(db.clone()),
            db,
            provider,
            producers,
            events,
            users: HashMap::new(),
            products: HashMap::new(),
            addresses: HashMap::new(),
            last_order: None,
            last_error: None,
            last_outcome: None,
        }
    }

    pub fn use_item_source(&mut self, source: ItemSource) {
        let options = CheckoutOptions { item_source: source, ..self.flow.options().clone() };
        self.flow = CheckoutFlowApi::new(self.db.clone(), self.provider.clone(), self.producers.clone(), options);
    }

    pub fn user(&self, name: &str) -> i64 {
        *self.users.get(name).unwrap_or_else(|| panic!("No user called {name}"))
    }

    pub fn product(&self, name: &str) -> i64 {
        *self.products.get(name).unwrap_or_else(|| panic!("No product called {name}"))
    }

    pub fn address(&self, name: &str) -> i64 {
        *self.addresses.get(name).unwrap_or_else(|| panic!("No address called {name}"))
    }

    pub fn last_order(&self) -> OrderId {
        self.last_order.clone().expect("No order has been placed")
    }
}

fn start_event_log(log: Arc<Mutex<EventLog>>) -> EventProducers {
    let mut hooks = EventHooks::default();
    let finalized_log = log.clone();
    hooks.on_order_finalized(move |ev| {
        let log = finalized_log.clone();
        Box::pin(async move {
            log.lock().unwrap().finalized.push(ev.order.order_id.clone());
        })
    });
    hooks.on_order_annulled(move |ev| {
        let log = log.clone();
        Box::pin(async move {
            log.lock().unwrap().annulled.push((ev.order.order_id.clone(), ev.status));
        })
    });
    let handlers = EventHandlers::new(16, hooks);
    let producers = handlers.producers();
    handlers.start_handlers();
    producers
}
