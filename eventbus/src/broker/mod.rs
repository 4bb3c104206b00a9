//! 消息代理协议（broker）
//!
//! 定义事件子系统消费的代理客户端原语与记录模型：
//! - `BrokerProducer`：带确认的消息发送（线程安全共享句柄）；
//! - `BrokerConsumer`：订阅、限时拉取、异步位点提交与关闭（单监听器独占）；
//! - `Broker`：共享生产者句柄与独占消费者的工厂；
//! - `InMemoryBroker`：内存实现，用于测试、示例与本地开发。
//!
//! 该模块仅定义协议与内存实现，可在其上适配任意支持分区与消费组的
//! 消息中间件。
//!
pub mod client;
pub mod consumer;
pub mod inmemory;
pub mod producer;
pub mod record;

pub use client::Broker;
pub use consumer::BrokerConsumer;
pub use inmemory::InMemoryBroker;
pub use producer::BrokerProducer;
pub use record::{ConsumerRecord, Header, ProducerRecord, RecordMetadata};
