//! 事件总线契约（DomainEventBus）
//!
//! 应用侧唯一依赖的接口：`post` 发布事件（至少一次），`register`
//! 注册处理器。监听器与总控属于装配细节，不在此契约内。
//!
use crate::domain_event::DomainEvent;
use crate::error::BusResult as Result;
use crate::eventing::handler::EventHandler;
use crate::eventing::publisher::EventPublisher;
use crate::eventing::registry::HandlerRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// 事件总线：发布事件与注册处理器
#[async_trait]
pub trait DomainEventBus: Send + Sync {
    /// 发布一个事件（至少一次语义；重试耗尽后错误上抛给调用方）
    async fn post<E>(&self, event: &E) -> Result<()>
    where
        E: DomainEvent;

    /// 注册事件处理器（并发安全；按事件类型去重）
    fn register<E>(&self, handler: Arc<dyn EventHandler<E>>) -> Result<()>
    where
        E: DomainEvent;
}

/// 基于消息代理的事件总线实现
pub struct BrokerEventBus {
    publisher: EventPublisher,
    registry: Arc<HandlerRegistry>,
}

impl BrokerEventBus {
    pub fn new(publisher: EventPublisher, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            publisher,
            registry,
        }
    }

    /// 与总控共享的注册表
    pub fn registry(&self) -> Arc<HandlerRegistry> {
        self.registry.clone()
    }
}

#[async_trait]
impl DomainEventBus for BrokerEventBus {
    async fn post<E>(&self, event: &E) -> Result<()>
    where
        E: DomainEvent,
    {
        self.publisher.post(event).await
    }

    fn register<E>(&self, handler: Arc<dyn EventHandler<E>>) -> Result<()>
    where
        E: DomainEvent,
    {
        self.registry.register(handler)
    }
}
