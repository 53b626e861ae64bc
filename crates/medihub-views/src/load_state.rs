//! 页面加载状态机
//!
//! `Idle → Loading → (Ready | Failed)`，`Ready` 和 `Failed` 可以重新进入 `Loading`
//! （刷新、重试）。

use medihub_core::{MediHubError, Result};
use std::fmt;

/// 页面数据的加载状态
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// 状态转换事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Begin,
    Resolve,
    Reject,
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Begin => "begin",
            Self::Resolve => "resolve",
            Self::Reject => "reject",
        };
        f.write_str(name)
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, event: LoadEvent) -> bool {
        match event {
            LoadEvent::Begin => true,
            LoadEvent::Resolve | LoadEvent::Reject => matches!(self, Self::Loading),
        }
    }

    fn check(&self, event: LoadEvent) -> Result<()> {
        if self.can_transition(event) {
            Ok(())
        } else {
            Err(MediHubError::InvalidStateTransition {
                from: self.name().to_string(),
                event: event.to_string(),
            })
        }
    }

    /// 进入加载中。任何状态都可以开始（重新）加载
    pub fn begin(&mut self) -> Result<()> {
        self.check(LoadEvent::Begin)?;
        *self = Self::Loading;
        Ok(())
    }

    pub fn resolve(&mut self, data: T) -> Result<()> {
        self.check(LoadEvent::Resolve)?;
        *self = Self::Ready(data);
        Ok(())
    }

    pub fn reject(&mut self, message: impl Into<String>) -> Result<()> {
        self.check(LoadEvent::Reject)?;
        *self = Self::Failed(message.into());
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
