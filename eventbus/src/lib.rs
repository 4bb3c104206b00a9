//! 领域事件总线基础库（eventbus）
//!
//! 提供以消息代理为底座的领域事件发布/订阅构件：
//! - 事件模型（`domain_event`）：事件信封元数据与事件能力边界
//! - 代理协议（`broker`）：带确认发送、限时拉取、位点提交与内存实现
//! - 派发运行时（`eventing`）：发布端、监听器、总控与处理器注册表
//!
//! 本 crate 不绑定具体消息系统，仅定义协议与运行时；`InMemoryBroker`
//! 面向测试、示例与本地开发，生产部署可在 `Broker` 协议上适配任意
//! 支持分区与消费组的消息中间件。
//!
//! 典型用法：
//! 1. 定义事件类型并实现 `DomainEvent`（稳定类型名 + 路由键）；
//! 2. 将处理器注册进 `HandlerRegistry`（同一事件类型至多一个）；
//! 3. 用 `ListenerSupervisor::run` 启动监听，用 `BrokerEventBus::post` 发布；
//! 4. 停机时通过 `SupervisorHandle::shutdown` 限期回收监听任务。
//!
pub mod broker;
pub mod domain_event;
pub mod error;
pub mod eventing;

pub use broker::{Broker, BrokerConsumer, BrokerProducer, InMemoryBroker};
pub use domain_event::{DomainEvent, EventMetadata};
pub use error::{BusResult, EventBusError};
pub use eventing::{
    BrokerEventBus, DomainEventBus, EventBusConfig, EventHandler, EventListener, EventPublisher,
    HandlerRegistry, ListenerSupervisor, SupervisorHandle,
};
