//! 옵션 전략 정의.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::leg::Leg;
use crate::error::BacktestError;

/// 하나의 포지션으로 분석되는 레그의 순서 있는 집합.
///
/// 레그 순서는 표시용이며 페이오프에는 영향을 주지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// 서비스에 저장된 전략 ID (없으면 로컬 전략)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 전략 이름
    pub name: String,
    /// 레그 목록
    #[serde(default)]
    pub legs: Vec<Leg>,
}

impl Strategy {
    /// 레그가 없는 새 전략을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            legs: Vec::new(),
        }
    }

    /// 서비스 측 전략 ID를 설정합니다.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 레그를 추가합니다.
    pub fn with_leg(mut self, leg: Leg) -> Self {
        self.legs.push(leg);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// 가장 낮은/높은 행사가.
    pub fn strike_bounds(&self) -> Option<(f64, f64)> {
        self.legs.iter().map(Leg::strike).fold(None, |acc, k| match acc {
            None => Some((k, k)),
            Some((lo, hi)) => Some((lo.min(k), hi.max(k))),
        })
    }
}

/// 백테스트 제출 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// 백테스트할 전략
    pub strategy: Strategy,
    /// 시작일
    pub start_date: NaiveDate,
    /// 종료일
    pub end_date: NaiveDate,
}

impl BacktestRequest {
    /// 새 요청을 생성합니다.
    ///
    /// # Errors
    /// 시작일이 종료일보다 늦으면 `BacktestError::Submission`을 반환합니다.
    pub fn new(
        strategy: Strategy,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, BacktestError> {
        if start_date > end_date {
            return Err(BacktestError::Submission(format!(
                "start date {} is after end date {}",
                start_date, end_date
            )));
        }

        Ok(Self {
            strategy,
            start_date,
            end_date,
        })
    }
}
