//! 事件发布端（EventPublisher）
//!
//! 将事件序列化为 JSON 文本，发送至以事件类型名命名的主题，分区键取
//! 事件路由键；发送在确认超时内等待 broker 确认，整次发布按固定退避
//! 重试，预算耗尽后以携带最后一次原因的错误上抛。
//!
use crate::broker::producer::BrokerProducer;
use crate::broker::record::{ProducerRecord, RecordMetadata};
use crate::domain_event::DomainEvent;
use crate::error::{BusResult as Result, EventBusError};
use crate::eventing::config::EventBusConfig;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};

/// 事件发布端
#[derive(Clone)]
pub struct EventPublisher {
    producer: Arc<dyn BrokerProducer>,
    config: EventBusConfig,
}

impl EventPublisher {
    pub fn new(producer: Arc<dyn BrokerProducer>, config: EventBusConfig) -> Self {
        Self { producer, config }
    }

    /// 发布一个事件（至少一次语义）
    ///
    /// 序列化或发送阶段的任何失败都触发整体重试；全部尝试耗尽后返回
    /// [`EventBusError::PublishExhausted`]，交由调用方处理。
    pub async fn post<E>(&self, event: &E) -> Result<()>
    where
        E: DomainEvent,
    {
        let attempts = self.config.publish_attempts.max(1);
        let mut last_err: Option<EventBusError> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(self.config.publish_backoff).await;
            }

            match self.try_send(event).await {
                Ok(ack) => {
                    debug!(
                        topic = ack.topic.as_str(),
                        key = %event.routing_key(),
                        partition = ack.partition,
                        offset = ack.offset,
                        "event published"
                    );
                    return Ok(());
                }
                Err(err) => {
                    warn!(
                        topic = E::TYPE,
                        attempt,
                        attempts,
                        error = %err,
                        "publish attempt failed"
                    );
                    last_err = Some(err);
                }
            }
        }

        let source = last_err.unwrap_or_else(|| EventBusError::broker("publish failed"));
        let err = EventBusError::PublishExhausted {
            topic: E::TYPE.to_string(),
            attempts,
            source: Box::new(source),
        };
        error!(topic = E::TYPE, error = %err, "publish exhausted");
        Err(err)
    }

    async fn try_send<E>(&self, event: &E) -> Result<RecordMetadata>
    where
        E: DomainEvent,
    {
        let payload = serde_json::to_string(event)?;
        let record = ProducerRecord::builder()
            .topic(E::TYPE.to_string())
            .key(event.routing_key())
            .payload(payload)
            .build();

        match timeout(self.config.ack_timeout, self.producer.send(record)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(EventBusError::AckTimeout {
                topic: E::TYPE.to_string(),
                timeout_ms: self.config.ack_timeout.as_millis() as u64,
            }),
        }
    }
}
