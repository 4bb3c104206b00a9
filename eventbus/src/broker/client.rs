//! 消息代理客户端协议（Broker）
//!
use crate::broker::consumer::BrokerConsumer;
use crate::broker::producer::BrokerProducer;
use crate::error::BusResult as Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 消息代理：共享生产者句柄与独占消费者的工厂
#[async_trait]
pub trait Broker: Send + Sync {
    /// 返回共享的线程安全生产者句柄
    fn producer(&self) -> Arc<dyn BrokerProducer>;

    /// 为给定消费组创建一个新的独占消费者
    async fn consumer(&self, group_id: &str) -> Result<Box<dyn BrokerConsumer>>;
}
