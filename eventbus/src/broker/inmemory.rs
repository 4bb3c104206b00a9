//! 内存版消息代理（InMemoryBroker）
//!
//! 满足 `Broker` 协议的轻量实现：
//! - 主题首次使用时自动创建，分区数固定（至少为 1）；
//! - 记录按分区键哈希落入分区，分区内保持追加序；
//! - 以（消费组, 主题, 分区）维度记录已提交位点，新消费者从已提交
//!   位点续读，未提交记录将被重复投递（至少一次语义）；
//! - `poll` 在无记录可读时挂起等待新记录到达，直到超时窗口结束；
//! - 典型用途：测试环境、示例与本地开发。
//!
use crate::broker::client::Broker;
use crate::broker::consumer::BrokerConsumer;
use crate::broker::producer::BrokerProducer;
use crate::broker::record::{ConsumerRecord, Header, ProducerRecord, RecordMetadata};
use crate::error::{BusResult as Result, EventBusError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

/// 简单的内存消息代理实现
#[derive(Clone)]
pub struct InMemoryBroker {
    core: Arc<BrokerCore>,
}

impl InMemoryBroker {
    /// 创建内存代理，`partitions` 为每个主题的分区数（至少为 1）
    pub fn new(partitions: usize) -> Self {
        Self {
            core: Arc::new(BrokerCore {
                topics: DashMap::new(),
                committed: DashMap::new(),
                partitions: partitions.max(1),
                notify: Notify::new(),
            }),
        }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    fn producer(&self) -> Arc<dyn BrokerProducer> {
        Arc::new(InMemoryProducer {
            core: self.core.clone(),
        })
    }

    async fn consumer(&self, group_id: &str) -> Result<Box<dyn BrokerConsumer>> {
        Ok(Box::new(InMemoryConsumer {
            core: self.core.clone(),
            group: group_id.to_string(),
            subscriptions: Vec::new(),
            positions: HashMap::new(),
            closed: false,
        }))
    }
}

struct BrokerCore {
    topics: DashMap<String, Arc<TopicState>>,
    /// （消费组, 主题, 分区）-> 已提交位点（下一条待读位置）
    committed: DashMap<(String, String, usize), u64>,
    partitions: usize,
    notify: Notify,
}

struct TopicState {
    partitions: Vec<Mutex<Vec<StoredRecord>>>,
}

#[derive(Clone)]
struct StoredRecord {
    key: String,
    payload: String,
    headers: Vec<Header>,
}

impl BrokerCore {
    fn topic(&self, name: &str) -> Arc<TopicState> {
        let state = self.topics.entry(name.to_string()).or_insert_with(|| {
            Arc::new(TopicState {
                partitions: (0..self.partitions).map(|_| Mutex::new(Vec::new())).collect(),
            })
        });
        Arc::clone(state.value())
    }

    fn partition_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.partitions
    }
}

struct InMemoryProducer {
    core: Arc<BrokerCore>,
}

#[async_trait]
impl BrokerProducer for InMemoryProducer {
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata> {
        let topic = record.topic().to_string();
        let partition = self.core.partition_for(record.key());
        let state = self.core.topic(&topic);

        let offset = {
            let mut slot = state.partitions[partition].lock().await;
            slot.push(StoredRecord {
                key: record.key().to_string(),
                payload: record.payload().to_string(),
                headers: record.headers().to_vec(),
            });
            (slot.len() - 1) as u64
        };

        self.core.notify.notify_waiters();

        Ok(RecordMetadata {
            topic,
            partition,
            offset,
        })
    }
}

struct InMemoryConsumer {
    core: Arc<BrokerCore>,
    group: String,
    subscriptions: Vec<String>,
    /// （主题, 分区）-> 下一条待读位置（尚未提交）
    positions: HashMap<(String, usize), u64>,
    closed: bool,
}

impl InMemoryConsumer {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(EventBusError::ConsumerClosed {
                group: self.group.clone(),
            });
        }
        Ok(())
    }

    async fn fetch_available(&mut self) -> Vec<ConsumerRecord> {
        let subscriptions = self.subscriptions.clone();
        let mut out = Vec::new();

        for topic_name in subscriptions {
            let Some(state) = self.core.topics.get(&topic_name).map(|t| Arc::clone(t.value()))
            else {
                continue;
            };
            for partition in 0..state.partitions.len() {
                let pos = self
                    .positions
                    .entry((topic_name.clone(), partition))
                    .or_insert(0);
                let slot = state.partitions[partition].lock().await;
                while (*pos as usize) < slot.len() {
                    let stored = &slot[*pos as usize];
                    out.push(ConsumerRecord {
                        topic: topic_name.clone(),
                        partition,
                        offset: *pos,
                        key: stored.key.clone(),
                        payload: stored.payload.clone(),
                        headers: stored.headers.clone(),
                    });
                    *pos += 1;
                }
            }
        }

        out
    }
}

#[async_trait]
impl BrokerConsumer for InMemoryConsumer {
    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.ensure_open()?;

        // 预创建主题，使后续 poll 能看到尚未有记录的主题
        let state = self.core.topic(topic);
        for partition in 0..state.partitions.len() {
            let committed = self
                .core
                .committed
                .get(&(self.group.clone(), topic.to_string(), partition))
                .map(|v| *v)
                .unwrap_or(0);
            self.positions.insert((topic.to_string(), partition), committed);
        }
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    async fn poll(&mut self, timeout: Duration) -> Result<Vec<ConsumerRecord>> {
        self.ensure_open()?;
        let deadline = Instant::now() + timeout;

        loop {
            let core = Arc::clone(&self.core);
            let notified = core.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let batch = self.fetch_available().await;
            if !batch.is_empty() {
                return Ok(batch);
            }

            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }
            let _ = tokio::time::timeout_at(deadline, notified).await;
        }
    }

    fn commit_async(&mut self) {
        if self.closed {
            return;
        }
        for ((topic, partition), pos) in self.positions.iter() {
            self.core
                .committed
                .insert((self.group.clone(), topic.clone(), *partition), *pos);
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.subscriptions.clear();
        self.positions.clear();
        Ok(())
    }
}
