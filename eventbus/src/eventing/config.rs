//! 事件总线配置
//!
use std::time::Duration;

/// 事件总线配置
///
/// 超时、重试与主题参数均提供默认值，可按部署环境逐项覆盖。
#[derive(Clone, Debug)]
pub struct EventBusConfig {
    /// 发布端等待 broker 确认的上限
    pub ack_timeout: Duration,
    /// 单次发布的总尝试次数（含首次）
    pub publish_attempts: u32,
    /// 相邻发布尝试之间的固定退避
    pub publish_backoff: Duration,
    /// 监听器单次拉取的窗口
    pub poll_timeout: Duration,
    /// 停机时等待监听任务结束的宽限期
    pub shutdown_grace: Duration,
    /// 同一进程内所有监听器共享的消费组标识
    pub group_id: String,
    /// 全部事件类型共享的死信主题
    pub dlq_topic: String,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(5),
            publish_attempts: 3,
            publish_backoff: Duration::from_secs(1),
            poll_timeout: Duration::from_millis(100),
            shutdown_grace: Duration::from_secs(30),
            group_id: "domain-event-bus".to_string(),
            dlq_topic: "event.dlq-topic".to_string(),
        }
    }
}
