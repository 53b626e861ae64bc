//! 带代次的页面状态
//!
//! 每次开始加载时代次加一并发出票据。加载完成时只有持有最新票据的结果会被写入，
//! 被后续加载取代的旧结果直接丢弃，避免快速切换时旧数据覆盖新数据。

use crate::load_state::LoadState;
use tracing::debug;

/// 一次加载的票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// 页面状态容器
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    state: LoadState<T>,
    generation: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LoadState<T> {
        &mut self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 开始新的加载，之前发出的票据全部失效
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// 写入加载结果，票据过期时丢弃并返回 `false`
    pub fn resolve(&mut self, ticket: LoadTicket, data: T) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale load result (generation {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }
        self.state.resolve(data).is_ok()
    }

    /// 写入加载失败，票据过期时丢弃并返回 `false`
    pub fn reject(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale load failure (generation {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }
        self.state.reject(message).is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.state.data_mut()
    }
}
