//! 消息消费者协议（BrokerConsumer）
//!
use crate::broker::record::ConsumerRecord;
use crate::error::BusResult as Result;
use async_trait::async_trait;
use std::time::Duration;

/// 消息消费者：订阅主题并以限时拉取的方式消费
///
/// 句柄由单一监听器独占，不跨线程共享；并发使用同一句柄是不安全的，
/// 由“一类型一消费者”的结构约束避免。
#[async_trait]
pub trait BrokerConsumer: Send + Sync {
    /// 订阅主题；订阅失败按启动期配置错误处理
    async fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// 限时拉取一批记录；窗口内无记录时返回空批
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<ConsumerRecord>>;

    /// 异步提交当前消费位点（fire-and-forget，失败由实现记录日志）
    fn commit_async(&mut self);

    /// 释放消费者句柄（幂等）
    async fn close(&mut self) -> Result<()>;
}
