use async_trait::async_trait;
use eventbus::broker::Broker;
use eventbus::{
    BrokerEventBus, DomainEvent, DomainEventBus, EventBusConfig, EventHandler, EventMetadata,
    EventPublisher, HandlerRegistry, InMemoryBroker, ListenerSupervisor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

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

struct OrderCreatedHandler;

#[async_trait]
impl EventHandler<OrderCreated> for OrderCreatedHandler {
    async fn handle(&self, event: OrderCreated) -> anyhow::Result<()> {
        info!(
            event_id = event.event_id(),
            order_id = event.order_id.as_str(),
            amount = event.amount,
            "order created"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,eventbus=debug")),
        )
        .init();

    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::default());
    let config = EventBusConfig::default();

    // 注册处理器
    let registry = Arc::new(HandlerRegistry::new());
    let bus = BrokerEventBus::new(
        EventPublisher::new(broker.producer(), config.clone()),
        registry.clone(),
    );
    bus.register::<OrderCreated>(Arc::new(OrderCreatedHandler))?;

    // 启动监听
    let handle = ListenerSupervisor::builder()
        .broker(broker.clone())
        .registry(registry)
        .config(config)
        .build()
        .run()
        .await?;

    // 发布事件
    for i in 1i64..=3 {
        bus.post(&OrderCreated::new(&i.to_string(), i * 100)).await?;
    }

    // 留出几个拉取窗口让监听器消费完，再限期停机
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.shutdown().await;

    Ok(())
}
