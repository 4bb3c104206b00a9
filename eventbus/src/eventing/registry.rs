//! 处理器注册表（HandlerRegistry）
//!
//! 以事件类型名为键的并发安全注册表。注册时将“解码 + 分发”封装为
//! 类型擦除的闭包，供监听器在运行时按原始载荷调用。
//! 同一事件类型至多注册一个处理器，重复注册按启动期配置错误处理。
//!
use crate::domain_event::DomainEvent;
use crate::error::{BusResult as Result, EventBusError};
use crate::eventing::handler::EventHandler;
use anyhow::Context;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type DispatchFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

type DispatchFn = Arc<dyn Fn(String) -> DispatchFuture + Send + Sync>;

/// 一条注册项：事件类型与类型擦除后的分发入口
#[derive(Clone)]
pub struct HandlerBinding {
    event_type: &'static str,
    handler_name: String,
    dispatch: DispatchFn,
}

impl HandlerBinding {
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    /// 解码原始载荷并调用处理器
    pub async fn dispatch(&self, payload: String) -> anyhow::Result<()> {
        (self.dispatch)(payload).await
    }
}

/// 处理器注册表
#[derive(Default)]
pub struct HandlerRegistry {
    bindings: DashMap<&'static str, HandlerBinding>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册事件处理器
    ///
    /// 去重键为事件类型常量 `E::TYPE`（而非处理器名称），同一类型的
    /// 二次注册返回 [`EventBusError::AlreadyRegistered`]。可从多线程
    /// 并发调用。
    pub fn register<E>(&self, handler: Arc<dyn EventHandler<E>>) -> Result<()>
    where
        E: DomainEvent,
    {
        let handler_name = handler.handler_name().to_string();

        let dispatch: DispatchFn = Arc::new(move |payload: String| {
            let handler = handler.clone();
            Box::pin(async move {
                let event: E = serde_json::from_str(&payload)
                    .with_context(|| format!("decode {} payload", E::TYPE))?;
                handler.handle(event).await
            })
        });

        match self.bindings.entry(E::TYPE) {
            Entry::Occupied(_) => Err(EventBusError::AlreadyRegistered {
                event_type: E::TYPE,
            }),
            Entry::Vacant(slot) => {
                slot.insert(HandlerBinding {
                    event_type: E::TYPE,
                    handler_name,
                    dispatch,
                });
                Ok(())
            }
        }
    }

    /// 当前全部注册项的快照
    pub fn bindings(&self) -> Vec<HandlerBinding> {
        self.bindings.iter().map(|e| e.value().clone()).collect()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.bindings.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::EventMetadata;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pinged {
        meta: EventMetadata,
        seq: u64,
    }

    impl DomainEvent for Pinged {
        const TYPE: &'static str = "Pinged";

        fn metadata(&self) -> &EventMetadata {
            &self.meta
        }

        fn routing_key(&self) -> String {
            self.seq.to_string()
        }
    }

    #[derive(Default)]
    struct SpyHandler {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait::async_trait]
    impl EventHandler<Pinged> for SpyHandler {
        async fn handle(&self, event: Pinged) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(event.seq);
            Ok(())
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = HandlerRegistry::new();
        registry
            .register::<Pinged>(Arc::new(SpyHandler::default()))
            .unwrap();

        let err = registry
            .register::<Pinged>(Arc::new(SpyHandler::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            EventBusError::AlreadyRegistered {
                event_type: "Pinged"
            }
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Pinged"));
    }

    #[tokio::test]
    async fn binding_decodes_and_dispatches() {
        let registry = HandlerRegistry::new();
        let handler = Arc::new(SpyHandler::default());
        registry.register::<Pinged>(handler.clone()).unwrap();

        let binding = registry.bindings().pop().unwrap();
        assert_eq!(binding.event_type(), "Pinged");
        assert_eq!(binding.handler_name(), "Pinged");

        let event = Pinged {
            meta: EventMetadata::new(),
            seq: 7,
        };
        let payload = serde_json::to_string(&event).unwrap();
        binding.dispatch(payload).await.unwrap();
        assert_eq!(*handler.seen.lock().unwrap(), vec![7]);

        // 非法载荷走解码失败路径
        let err = binding.dispatch("not-json".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("decode Pinged payload"));
    }
}
