//! 消息记录模型
//!
//! 发送侧与消费侧的记录形态，以及 broker 确认后的元信息。
//! 载荷统一为 JSON 文本。
//!
use bon::Builder;

/// 消息头（键值对，随记录透传；死信记录借此携带错误信息）
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 待发送记录：目标主题、分区键与载荷
#[derive(Debug, Clone, Builder)]
pub struct ProducerRecord {
    topic: String,
    key: String,
    payload: String,
    #[builder(default)]
    headers: Vec<Header>,
}

impl ProducerRecord {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }
}

/// broker 确认后的记录元信息
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: usize,
    pub offset: u64,
}

/// 消费侧拉取到的记录
#[derive(Debug, Clone)]
pub struct ConsumerRecord {
    pub topic: String,
    pub partition: usize,
    pub offset: u64,
    pub key: String,
    pub payload: String,
    pub headers: Vec<Header>,
}
