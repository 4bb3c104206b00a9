//! 事件总线统一错误定义
//!
//! 聚焦序列化、代理传输、确认超时、重试耗尽与注册冲突等最小必要集合，
//! 便于各实现层统一转换为 `EventBusError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventBusError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 代理传输 ---
    #[error("broker error: {reason}")]
    Broker { reason: String },
    #[error("publish ack timeout: topic={topic}, timeout={timeout_ms}ms")]
    AckTimeout { topic: String, timeout_ms: u64 },
    #[error("publish failed after {attempts} attempts: topic={topic}, last error: {source}")]
    PublishExhausted {
        topic: String,
        attempts: u32,
        source: Box<EventBusError>,
    },
    #[error("consumer closed: group={group}")]
    ConsumerClosed { group: String },

    // --- 启动期配置 ---
    #[error("handler already registered: event_type={event_type}")]
    AlreadyRegistered { event_type: &'static str },
}

impl EventBusError {
    pub fn broker(reason: impl Into<String>) -> Self {
        EventBusError::Broker {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type BusResult<T> = Result<T, EventBusError>;
