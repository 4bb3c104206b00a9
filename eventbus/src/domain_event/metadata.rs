use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 事件信封元数据
///
/// `event_id` 与 `occurred_at` 在构造时一次性赋值，此后不可变。
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    event_id: String,
    occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// 以进程级唯一标识生成器与当前时间构造元数据
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            occurred_at: Utc::now(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}
