//! 监听器总控（ListenerSupervisor）
//!
//! 启动期按注册表装配监听器：为每个事件类型创建独占消费者（共享同一
//! 消费组标识）、完成订阅，并在共享运行时上启动拉取任务；订阅失败按
//! 启动期配置错误处理，直接上抛中止装配。返回的句柄用于停止信号与
//! 限期停机，停机过程中的异常只记录日志，从不上抛。
//!
use crate::broker::client::Broker;
use crate::error::BusResult as Result;
use crate::eventing::config::EventBusConfig;
use crate::eventing::listener::EventListener;
use crate::eventing::registry::HandlerRegistry;
use bon::Builder;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 监听器总控
#[derive(Builder)]
pub struct ListenerSupervisor {
    broker: Arc<dyn Broker>,
    registry: Arc<HandlerRegistry>,
    #[builder(default)]
    config: EventBusConfig,
}

impl ListenerSupervisor {
    /// 启动全部监听器，返回停机句柄
    ///
    /// `run` 消费掉总控自身：同一批注册项只会被装配一次，配合注册表
    /// 的类型唯一键，每个事件类型至多存在一个在运行的监听器。
    pub async fn run(self) -> Result<SupervisorHandle> {
        let token = CancellationToken::new();
        let producer = self.broker.producer();
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        let mut listeners: HashMap<String, CancellationToken> = HashMap::new();

        for binding in self.registry.bindings() {
            let event_type = binding.event_type();

            let mut consumer = self.broker.consumer(&self.config.group_id).await?;
            consumer.subscribe(event_type).await?;

            let child = token.child_token();
            let listener = EventListener::new(
                binding,
                consumer,
                producer.clone(),
                self.config.dlq_topic.clone(),
                self.config.poll_timeout,
                child.clone(),
            );

            listeners.insert(event_type.to_string(), child);
            tasks.push(tokio::spawn(listener.run()));
            info!(
                topic = event_type,
                group = self.config.group_id.as_str(),
                "listener launched"
            );
        }

        Ok(SupervisorHandle {
            token,
            tasks,
            listeners,
            shutdown_grace: self.config.shutdown_grace,
        })
    }
}

/// 总控运行句柄：停止信号与限期停机
pub struct SupervisorHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    listeners: HashMap<String, CancellationToken>,
    shutdown_grace: Duration,
}

impl SupervisorHandle {
    /// 当前在运行的监听器对应的事件类型
    pub fn listener_topics(&self) -> Vec<String> {
        self.listeners.keys().cloned().collect()
    }

    /// 是否存在某事件类型的监听器
    pub fn has_listener(&self, event_type: &str) -> bool {
        self.listeners.contains_key(event_type)
    }

    /// 向全部监听器发送停止信号（幂等）
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// 停止单个监听器（幂等；未注册的类型为空操作）
    pub fn stop_listener(&self, event_type: &str) {
        if let Some(listener) = self.listeners.get(event_type) {
            listener.cancel();
        }
    }

    /// 限期停机
    ///
    /// 发出停止信号后等待监听任务在宽限期内自行结束；宽限期耗尽则
    /// 强制取消剩余任务。停机过程中的异常只记录日志，保证停机路径
    /// 总能走完。
    pub async fn shutdown(mut self) {
        self.stop();

        let tasks = std::mem::take(&mut self.tasks);
        if tasks.is_empty() {
            return;
        }

        let abort_handles: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();
        match timeout(self.shutdown_grace, join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    if let Err(err) = result {
                        error!(error = %err, "listener task ended abnormally");
                    }
                }
                info!("all listeners drained");
            }
            Err(_elapsed) => {
                warn!(
                    grace = ?self.shutdown_grace,
                    "shutdown grace elapsed, aborting remaining listeners"
                );
                for handle in abort_handles {
                    handle.abort();
                }
            }
        }
    }
}

impl Drop for SupervisorHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
