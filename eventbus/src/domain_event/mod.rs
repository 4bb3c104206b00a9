//! 领域事件模型（domain_event）
//!
//! 定义事件的能力边界与信封元数据：
//! - `DomainEvent`：稳定类型名、信封元数据访问与路由键；
//! - `EventMetadata`：唯一标识与发生时间，构造时一次性赋值。
//!
pub mod domain_event_trait;
pub mod metadata;

pub use domain_event_trait::DomainEvent;
pub use metadata::EventMetadata;
