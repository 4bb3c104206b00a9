use super::metadata::EventMetadata;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件需要满足的通用能力边界
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 事件的稳定类型名，同时是发布主题名与注册去重键
    ///
    /// 建议使用常量字符串，不随重构变化；避免依赖 `type_name::<T>()`。
    /// 类型名不参与载荷序列化，消费侧由监听器的订阅主题静态可知。
    const TYPE: &'static str;

    /// 事件信封元数据（唯一标识与发生时间）
    fn metadata(&self) -> &EventMetadata;

    /// 路由键：相同键的事件落入同一分区，由同一消费通道按序处理
    fn routing_key(&self) -> String;

    /// 事件唯一标识
    fn event_id(&self) -> &str {
        self.metadata().event_id()
    }

    /// 事件发生时间
    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at()
    }
}
