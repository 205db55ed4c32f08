//! OptionForge 에러 타입.
//!
//! 페이오프 엔진과 백테스트 작업 추적기에서 사용하는 에러를 정의합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 페이오프 계산 에러.
///
/// 호출자의 프로그래밍 에러에 해당하므로 재시도하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoffError {
    /// 잘못된 가격 범위 (`start >= end`, `steps < 2` 등)
    #[error("잘못된 가격 범위: {0}")]
    InvalidRange(String),

    /// 잘못된 레그 (수량 0, 음수 행사가 등)
    #[error("잘못된 레그: {0}")]
    InvalidLeg(String),
}

/// 페이오프 계산을 위한 Result 타입.
pub type PayoffResult<T> = Result<T, PayoffError>;

/// 로깅 초기화 에러.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// 잘못된 필터 지시어 (`RUST_LOG` 또는 `logging.level`)
    #[error("잘못된 로그 필터 '{directives}': {reason}")]
    InvalidFilter { directives: String, reason: String },

    /// 전역 subscriber가 이미 설치됨
    #[error("로깅이 이미 초기화됨: {0}")]
    AlreadyInitialized(String),
}

/// 백테스트 작업 에러.
///
/// 모든 변형은 현재 작업에 대해 최종 상태입니다. 추적기는 자동 재시도하지
/// 않으며, 사용자는 새로 제출해야 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum BacktestError {
    /// 백테스트 제출 요청 실패
    #[error("백테스트 제출 실패: {0}")]
    Submission(String),

    /// 상태 조회 요청 실패 (네트워크/전송)
    #[error("상태 조회 실패: {0}")]
    Polling(String),

    /// 백엔드가 백테스트 실행 실패를 보고함
    #[error("백테스트 실행 실패: {0}")]
    JobExecution(String),

    /// 작업은 완료되었으나 결과를 가져오지 못함
    #[error("결과 조회 실패: {0}")]
    ResultFetch(String),

    /// 설정된 최대 폴링 시간 초과
    #[error("폴링 시간 초과: {0}")]
    PollingTimeout(String),
}

impl BacktestError {
    /// 에러 종류를 나타내는 짧은 식별자.
    pub fn kind(&self) -> &'static str {
        match self {
            BacktestError::Submission(_) => "submission",
            BacktestError::Polling(_) => "polling",
            BacktestError::JobExecution(_) => "job_execution",
            BacktestError::ResultFetch(_) => "result_fetch",
            BacktestError::PollingTimeout(_) => "polling_timeout",
        }
    }

    /// 사용자에게 보여줄 상세 메시지.
    pub fn message(&self) -> &str {
        match self {
            BacktestError::Submission(msg)
            | BacktestError::Polling(msg)
            | BacktestError::JobExecution(msg)
            | BacktestError::ResultFetch(msg)
            | BacktestError::PollingTimeout(msg) => msg,
        }
    }

    /// 백엔드 작업 자체가 실패했는지 확인합니다.
    ///
    /// 나머지는 클라이언트와 서비스 사이의 통신 문제입니다.
    pub fn is_job_failure(&self) -> bool {
        matches!(self, BacktestError::JobExecution(_))
    }
}
