use async_trait::async_trait;
use eventbus::broker::Broker;
use eventbus::{
    BrokerEventBus, DomainEvent, DomainEventBus, EventBusConfig, EventHandler, EventMetadata,
    EventPublisher, HandlerRegistry, InMemoryBroker, ListenerSupervisor,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OrderCreated {
    meta: EventMetadata,
    order_id: String,
    amount: i64,
}

impl OrderCreated {
    fn new(order_id: &str, amount: i64) -> Self {
        Self {
            meta: EventMetadata::new(),
            order_id: order_id.to_string(),
            amount,
        }
    }
}

impl DomainEvent for OrderCreated {
    const TYPE: &'static str = "OrderCreated";

    fn metadata(&self) -> &EventMetadata {
        &self.meta
    }

    fn routing_key(&self) -> String {
        format!("order-{}", self.order_id)
    }
}

#[derive(Default)]
struct SpyHandler {
    handled: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<OrderCreated>>>,
}

#[async_trait]
impl EventHandler<OrderCreated> for SpyHandler {
    async fn handle(&self, event: OrderCreated) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(event);
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn quick_config() -> EventBusConfig {
    EventBusConfig {
        ack_timeout: Duration::from_secs(1),
        publish_backoff: Duration::from_millis(10),
        poll_timeout: Duration::from_millis(20),
        shutdown_grace: Duration::from_secs(5),
        ..EventBusConfig::default()
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not reached in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn posted_event_reaches_broker_and_handler_exactly_once() {
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new(4));
    let config = quick_config();

    let registry = Arc::new(HandlerRegistry::new());
    let handler = Arc::new(SpyHandler::default());
    let handled = handler.handled.clone();
    let seen = handler.seen.clone();

    let bus = BrokerEventBus::new(
        EventPublisher::new(broker.producer(), config.clone()),
        registry.clone(),
    );
    bus.register::<OrderCreated>(handler).unwrap();

    let supervisor = ListenerSupervisor::builder()
        .broker(broker.clone())
        .registry(registry.clone())
        .config(config.clone())
        .build();
    let handle = supervisor.run().await.unwrap();
    assert!(handle.has_listener("OrderCreated"));

    let event = OrderCreated::new("42", 100);
    let expected_payload = serde_json::to_string(&event).unwrap();
    bus.post(&event).await.unwrap();

    // broker 上恰好一条记录：主题 = 事件类型名，键 = 路由键，载荷 = JSON 编码
    let mut probe = broker.consumer("probe").await.unwrap();
    probe.subscribe("OrderCreated").await.unwrap();
    let records = probe.poll(Duration::from_millis(500)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "OrderCreated");
    assert_eq!(records[0].key, "order-42");
    assert_eq!(records[0].payload, expected_payload);
    probe.close().await.unwrap();

    wait_until(move || handled.load(Ordering::SeqCst) == 1).await;
    let delivered = seen.lock().unwrap().pop().unwrap();
    assert_eq!(delivered.routing_key(), "order-42");
    assert_eq!(delivered, event);

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn events_with_same_routing_key_are_handled_in_publish_order() {
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new(4));
    let config = quick_config();

    let registry = Arc::new(HandlerRegistry::new());
    let handler = Arc::new(SpyHandler::default());
    let handled = handler.handled.clone();
    let seen = handler.seen.clone();
    registry.register::<OrderCreated>(handler).unwrap();

    let handle = ListenerSupervisor::builder()
        .broker(broker.clone())
        .registry(registry)
        .config(config.clone())
        .build()
        .run()
        .await
        .unwrap();

    let publisher = EventPublisher::new(broker.producer(), config);
    for amount in 1..=5 {
        // 同一 order_id => 同一路由键 => 同一分区
        publisher
            .post(&OrderCreated::new("7", amount))
            .await
            .unwrap();
    }

    wait_until(move || handled.load(Ordering::SeqCst) == 5).await;
    let amounts: Vec<i64> = seen.lock().unwrap().iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![1, 2, 3, 4, 5]);

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_handler_registration_fails_on_the_bus() {
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new(1));
    let registry = Arc::new(HandlerRegistry::new());
    let bus = BrokerEventBus::new(
        EventPublisher::new(broker.producer(), quick_config()),
        registry,
    );

    bus.register::<OrderCreated>(Arc::new(SpyHandler::default()))
        .unwrap();
    let err = bus
        .register::<OrderCreated>(Arc::new(SpyHandler::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        eventbus::EventBusError::AlreadyRegistered {
            event_type: "OrderCreated"
        }
    ));
}

#[tokio::test]
async fn serialized_event_round_trips_without_type_name() {
    let event = OrderCreated::new("42", 300);
    let payload = serde_json::to_string(&event).unwrap();

    // 类型名不进入线上文档，由主题承载
    assert!(!payload.contains("OrderCreated"));

    let decoded: OrderCreated = serde_json::from_str(&payload).unwrap();
    assert_eq!(decoded, event);
    assert_eq!(decoded.event_id(), event.event_id());
    assert_eq!(decoded.occurred_at(), event.occurred_at());
    assert_eq!(decoded.routing_key(), "order-42");
}
