//! 页面提示消息
//!
//! 短暂显示的提示（toast），多个页面共享同一个队列，超出容量时丢弃最早的消息。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 默认队列容量
pub const DEFAULT_CAPACITY: usize = 20;

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// 提示消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// 提示队列
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: Arc<RwLock<VecDeque<Notification>>>,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub async fn push(&self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        let id = notification.id;

        let mut queue = self.queue.write().await;
        queue.push_back(notification);
        while queue.len() > self.capacity {
            queue.pop_front();
        }
        id
    }

    pub async fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Success, message).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Info, message).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Error, message).await
    }

    /// 关闭一条提示
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let mut queue = self.queue.write().await;
        let before = queue.len();
        queue.retain(|n| n.id != id);
        queue.len() != before
    }

    /// 当前所有提示（不移除）
    pub async fn pending(&self) -> Vec<Notification> {
        self.queue.read().await.iter().cloned().collect()
    }

    /// 取出并清空所有提示
    pub async fn drain(&self) -> Vec<Notification> {
        self.queue.write().await.drain(..).collect()
    }
}
