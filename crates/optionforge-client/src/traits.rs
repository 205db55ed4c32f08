//! 백테스트 서비스 trait 정의.

use async_trait::async_trait;
use optionforge_core::{BacktestRequest, BacktestResult, JobId, JobStatus};

use crate::ServiceError;

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// 제출 응답.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    /// 서비스가 부여한 작업 ID
    pub job_id: JobId,
    /// 제출 직후 상태 (Pending 또는 Running)
    pub status: JobStatus,
}

/// 상태 조회 응답.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: JobStatus,
    /// 진행 메시지 또는 실패 원인
    pub detail: Option<String>,
}

impl StatusReport {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// 외부 백테스트 서비스 인터페이스.
///
/// 서비스는 제출을 받아 비동기로 실행하고 상태/결과 조회를 제공합니다.
#[async_trait]
pub trait BacktestService: Send + Sync {
    /// 서비스 이름 반환.
    fn name(&self) -> &str;

    /// 백테스트 제출.
    async fn submit_backtest(&self, request: &BacktestRequest) -> ServiceResult<JobTicket>;

    /// 작업 상태 조회.
    async fn get_status(&self, job_id: &JobId) -> ServiceResult<StatusReport>;

    /// 완료된 작업의 결과 조회.
    ///
    /// 아직 완료되지 않았으면 `ServiceError::NotReady`를 반환합니다.
    async fn get_result(&self, job_id: &JobId) -> ServiceResult<BacktestResult>;
}
