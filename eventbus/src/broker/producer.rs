//! 消息生产者协议（BrokerProducer）
//!
use crate::broker::record::{ProducerRecord, RecordMetadata};
use crate::error::BusResult as Result;
use async_trait::async_trait;

/// 消息生产者：发送记录并等待 broker 确认
///
/// 实现须线程安全：同一句柄由发布端与各监听器的死信转发共享复用。
#[async_trait]
pub trait BrokerProducer: Send + Sync {
    /// 发送一条记录，broker 确认后返回分区与位点
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata>;
}
