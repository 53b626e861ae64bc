//! 模拟网络延迟
//!
//! 模拟存储模式下每次服务调用前等待固定时长，使页面的加载状态可见。

use std::time::Duration;

/// 需要延迟的服务操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListPatients,
    GetPatient,
    CreatePatient,
    UpdatePatient,
    DeletePatient,
    RecentActivities,
    ListActivities,
    GetActivity,
    CreateActivity,
    ReadMedicalRecord,
    SaveMedicalRecord,
    ReadMetrics,
    RecordMetrics,
}

impl Operation {
    /// 各操作的模拟延迟
    pub fn delay(&self) -> Duration {
        let millis = match self {
            Self::ListPatients => 400,
            Self::GetPatient => 200,
            Self::CreatePatient => 500,
            Self::UpdatePatient => 300,
            Self::DeletePatient => 200,
            Self::RecentActivities => 250,
            Self::ListActivities => 300,
            Self::GetActivity => 200,
            Self::CreateActivity => 200,
            Self::ReadMedicalRecord => 300,
            Self::SaveMedicalRecord => 400,
            Self::ReadMetrics => 300,
            Self::RecordMetrics => 200,
        };
        Duration::from_millis(millis)
    }
}

/// 延迟策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Latency {
    enabled: bool,
}

impl Latency {
    /// 按操作模拟延迟
    pub fn simulated() -> Self {
        Self { enabled: true }
    }

    /// 不延迟（测试和远程模式）
    pub fn none() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn wait(&self, operation: Operation) {
        if self.enabled {
            tokio::time::sleep(operation.delay()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency_sleeps() {
        let start = tokio::time::Instant::now();
        Latency::simulated().wait(Operation::ListPatients).await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_latency_returns_immediately() {
        let start = tokio::time::Instant::now();
        Latency::none().wait(Operation::CreatePatient).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
