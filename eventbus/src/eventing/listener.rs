//! 事件监听器（EventListener）
//!
//! 每事件类型一条的长驻拉取循环：限时拉取一批记录，逐条解码并分发给
//! 处理器；解码或处理失败的记录原样转入死信主题（附错误消息头），循环
//! 继续；拉取层面的 broker 错误仅记录日志，不终结循环。停止为协作式
//! 且幂等，停止信号在每轮循环顶部被观察；循环退出时恰好释放一次消费者
//! 句柄，释放失败只记录日志。
//!
//! 状态机：Created → Running → Closing → Closed。Closed 不可重入，
//! 已关闭的监听器只能丢弃，不能重启。
//!
use crate::broker::consumer::BrokerConsumer;
use crate::broker::producer::BrokerProducer;
use crate::broker::record::{ConsumerRecord, Header, ProducerRecord};
use crate::eventing::registry::HandlerBinding;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 死信记录上携带错误消息的消息头键
pub const DLQ_ERROR_HEADER: &str = "x-dead-letter-reason";
/// 死信记录上携带来源主题的消息头键
pub const DLQ_SOURCE_TOPIC_HEADER: &str = "x-dead-letter-source-topic";

/// 每事件类型一条的拉取循环
pub struct EventListener {
    topic: String,
    binding: HandlerBinding,
    consumer: Box<dyn BrokerConsumer>,
    dlq_producer: Arc<dyn BrokerProducer>,
    dlq_topic: String,
    poll_timeout: Duration,
    token: CancellationToken,
}

impl EventListener {
    pub(crate) fn new(
        binding: HandlerBinding,
        consumer: Box<dyn BrokerConsumer>,
        dlq_producer: Arc<dyn BrokerProducer>,
        dlq_topic: String,
        poll_timeout: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            topic: binding.event_type().to_string(),
            binding,
            consumer,
            dlq_producer,
            dlq_topic,
            poll_timeout,
            token,
        }
    }

    /// 停止信号句柄；取消为幂等操作，重复取消与单次取消等效
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 运行拉取循环，直到停止信号被置位
    ///
    /// 已在途的一批记录会处理完毕后再退出；消费者句柄在退出时释放，
    /// 监听器随之终结。
    pub async fn run(mut self) {
        info!(topic = self.topic.as_str(), "listener started");

        while !self.token.is_cancelled() {
            let polled = self.consumer.poll(self.poll_timeout).await;
            match polled {
                Ok(records) => {
                    if records.is_empty() {
                        continue;
                    }
                    for record in records {
                        self.dispatch(record).await;
                    }
                    // 位点提交为 fire-and-forget，失败由消费者实现记录日志
                    self.consumer.commit_async();
                }
                Err(err) => {
                    // broker 瞬时抖动不应终结监听器
                    warn!(
                        topic = self.topic.as_str(),
                        error = %err,
                        "poll failed, keep polling"
                    );
                }
            }
        }

        if let Err(err) = self.consumer.close().await {
            warn!(topic = self.topic.as_str(), error = %err, "consumer close failed");
        }
        info!(topic = self.topic.as_str(), "listener closed");
    }

    async fn dispatch(&self, record: ConsumerRecord) {
        match self.binding.dispatch(record.payload.clone()).await {
            Ok(()) => {
                debug!(
                    topic = record.topic.as_str(),
                    partition = record.partition,
                    offset = record.offset,
                    "event handled"
                );
            }
            Err(err) => self.divert_to_dlq(record, &err).await,
        }
    }

    /// 将一条处理失败的原始记录转入死信主题
    async fn divert_to_dlq(&self, record: ConsumerRecord, cause: &anyhow::Error) {
        warn!(
            topic = record.topic.as_str(),
            partition = record.partition,
            offset = record.offset,
            handler = self.binding.handler_name(),
            error = %cause,
            "record diverted to dead-letter topic"
        );

        let dlq_record = ProducerRecord::builder()
            .topic(self.dlq_topic.clone())
            .key(record.key)
            .payload(record.payload)
            .headers(vec![
                Header::new(DLQ_ERROR_HEADER, format!("{cause:#}")),
                Header::new(DLQ_SOURCE_TOPIC_HEADER, record.topic),
            ])
            .build();

        if let Err(err) = self.dlq_producer.send(dlq_record).await {
            // 死信投递失败只能记录，循环不因此终止
            error!(topic = self.topic.as_str(), error = %err, "dead-letter send failed");
        }
    }
}
