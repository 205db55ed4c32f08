//! 백테스트 작업 상태 및 결과 타입.
//!
//! 이 모듈은 비동기 백테스트 작업의 관찰 가능한 스냅샷을 정의합니다:
//! - `JobId` - 서비스가 부여한 불투명 식별자
//! - `JobStatus` - 작업 상태
//! - `BacktestJob` - 상태/결과/에러 스냅샷
//! - `BacktestResult` - 요약 지표 및 일별 손익

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::BacktestError;

/// 백테스트 서비스가 부여한 작업 식별자.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// 백테스트 작업 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// 제출 요청 중 (아직 ID 없음)
    Submitting,
    /// 서비스 대기열에 있음
    Pending,
    /// 실행 중
    Running,
    /// 완료됨
    Completed,
    /// 실패함
    Failed,
}

impl JobStatus {
    /// 더 이상 전이가 일어나지 않는 최종 상태인지 확인합니다.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// 폴링 대상 상태인지 확인합니다.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Submitting => write!(f, "SUBMITTING"),
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUBMITTING" => Ok(Self::Submitting),
            "PENDING" => Ok(Self::Pending),
            "RUNNING" => Ok(Self::Running),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// 요약 지표 값 (숫자 또는 라벨).
///
/// 예: `profit_factor`는 손실이 없으면 `"inf"` 라벨로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Label(String),
}

impl MetricValue {
    /// 숫자 값이면 반환합니다.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Label(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{}", v),
            MetricValue::Label(s) => f.write_str(s),
        }
    }
}

/// 일별 손익 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    /// 날짜 (서비스가 전달한 형식 그대로)
    pub date: String,
    /// 누적 손익
    pub pnl: f64,
}

/// 일별 기초자산 가격 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingPrice {
    pub date: String,
    pub price: f64,
}

/// 완료된 백테스트 결과.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestResult {
    /// 지표 이름 → 값
    #[serde(default)]
    pub summary_metrics: BTreeMap<String, MetricValue>,
    /// 시간순 일별 손익
    #[serde(default)]
    pub daily_pnl: Vec<DailyPnl>,
    /// 시간순 기초자산 가격 (서비스가 제공하는 경우)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub underlying_price: Vec<UnderlyingPrice>,
}

impl BacktestResult {
    /// 이름으로 지표를 조회합니다.
    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.summary_metrics.get(name)
    }

    /// 마지막 거래일의 손익.
    pub fn final_pnl(&self) -> Option<f64> {
        self.daily_pnl.last().map(|p| p.pnl)
    }
}

/// 백테스트 작업 스냅샷.
///
/// 상태가 전이될 때마다 새 스냅샷이 만들어지며 기존 값은 변경되지 않습니다.
/// - `result`는 `Completed`일 때만 존재
/// - `error`는 `Failed`일 때만 존재
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestJob {
    /// 작업 ID (`Submitting` 중에는 없음)
    pub id: Option<JobId>,
    /// 현재 상태
    pub status: JobStatus,
    /// 완료 결과
    pub result: Option<BacktestResult>,
    /// 실패 원인
    pub error: Option<BacktestError>,
    /// 서비스가 전달한 부가 정보 (진행 메시지 등)
    pub detail: Option<String>,
}

impl BacktestJob {
    /// 제출 중인 새 작업 스냅샷.
    pub fn submitting() -> Self {
        Self {
            id: None,
            status: JobStatus::Submitting,
            result: None,
            error: None,
            detail: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Default for BacktestJob {
    fn default() -> Self {
        Self::submitting()
    }
}
