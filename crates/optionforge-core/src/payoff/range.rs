//! 기초자산 가격 샘플 범위.

use serde::{Deserialize, Serialize};

use crate::domain::Strategy;
use crate::error::{PayoffError, PayoffResult};

/// 양 끝을 포함하는 균등 간격 가격 범위.
///
/// `S_i = start + i * (end - start) / (steps - 1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// 시작 가격
    pub start: f64,
    /// 종료 가격
    pub end: f64,
    /// 샘플 개수 (>= 2)
    pub steps: usize,
}

impl PriceRange {
    /// 검증된 가격 범위를 생성합니다.
    pub fn new(start: f64, end: f64, steps: usize) -> PayoffResult<Self> {
        let range = Self { start, end, steps };
        range.validate()?;
        Ok(range)
    }

    /// 전략의 행사가를 중심으로 여유 비율만큼 넓힌 범위를 생성합니다.
    ///
    /// 레그가 없으면 `None`을 반환합니다. 가격은 0 아래로 내려가지 않습니다.
    pub fn around(strategy: &Strategy, padding_pct: f64, steps: usize) -> Option<PayoffResult<Self>> {
        let (lo, hi) = strategy.strike_bounds()?;
        let pad = (lo + hi) / 2.0 * padding_pct / 100.0;
        Some(Self::new((lo - pad).max(0.0), hi + pad, steps))
    }

    /// 범위를 검증합니다.
    pub fn validate(&self) -> PayoffResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(PayoffError::InvalidRange(format!(
                "bounds must be finite (start={}, end={})",
                self.start, self.end
            )));
        }
        if self.start >= self.end {
            return Err(PayoffError::InvalidRange(format!(
                "start ({}) must be less than end ({})",
                self.start, self.end
            )));
        }
        if self.steps < 2 {
            return Err(PayoffError::InvalidRange(format!(
                "steps must be at least 2, got {}",
                self.steps
            )));
        }
        Ok(())
    }

    /// 샘플 간격.
    pub fn step_size(&self) -> f64 {
        (self.end - self.start) / (self.steps - 1) as f64
    }

    /// 오름차순 샘플 가격 반복자.
    ///
    /// 마지막 샘플은 누적 오차 없이 정확히 `end`입니다.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        let last = self.steps.saturating_sub(1);
        (0..self.steps).map(move |i| {
            if i == last {
                self.end
            } else {
                self.start + i as f64 * (self.end - self.start) / last as f64
            }
        })
    }
}
