//! 事件处理器（EventHandler）
//!
//! 定义消费某一类型已解码事件的处理逻辑与元信息。
//!
use crate::domain_event::DomainEvent;
use async_trait::async_trait;

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: DomainEvent,
{
    /// 处理器名称（用于日志与死信标记）
    fn handler_name(&self) -> &str {
        E::TYPE
    }

    /// 处理事件
    async fn handle(&self, event: E) -> anyhow::Result<()>;
}
