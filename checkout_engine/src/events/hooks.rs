use std::{fmt::Debug, future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{EventHandler, EventProducer, Handler, OrderAnnulledEvent, OrderFinalizedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_finalized_producer: Vec<EventProducer<OrderFinalizedEvent>>,
    pub order_annulled_producer: Vec<EventProducer<OrderAnnulledEvent>>,
}

impl Debug for EventProducers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EventProducers (finalized: {}, annulled: {})",
            self.order_finalized_producer.len(),
            self.order_annulled_producer.len()
        )
    }
}

impl EventProducers {
    pub async fn publish_order_finalized(&self, event: OrderFinalizedEvent) {
        for producer in &self.order_finalized_producer {
            debug!("📬️ Notifying order finalized hook subscribers");
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_order_annulled(&self, event: OrderAnnulledEvent) {
        for producer in &self.order_annulled_producer {
            debug!("📬️ Notifying order annulled hook subscribers");
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_order_finalized: Option<EventHandler<OrderFinalizedEvent>>,
    pub on_order_annulled: Option<EventHandler<OrderAnnulledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_finalized = hooks.on_order_finalized.map(|f| EventHandler::new(buffer_size, f));
        let on_order_annulled = hooks.on_order_annulled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_finalized, on_order_annulled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_finalized {
            result.order_finalized_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_annulled {
            result.order_annulled_producer.push(handler.subscribe());
        }
        result
    }

    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_finalized {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_annulled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_finalized: Option<Handler<OrderFinalizedEvent>>,
    pub on_order_annulled: Option<Handler<OrderAnnulledEvent>>,
}

impl EventHooks {
    pub fn on_order_finalized<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderFinalizedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_finalized = Some(Arc::new(f));
        self
    }

    pub fn on_order_annulled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderAnnulledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_annulled = Some(Arc::new(f));
        self
    }
}
