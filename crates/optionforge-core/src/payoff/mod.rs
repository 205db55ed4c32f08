//! 만기 페이오프 엔진.
//!
//! 레그 집합과 가격 범위로부터 만기 손익 곡선을 계산하는 순수 함수를 제공합니다.
//! I/O나 공유 상태가 없으므로 어느 스레드에서든 동시에 호출할 수 있습니다.

mod curve;
mod range;

pub use curve::{PayoffCurve, PayoffPoint};
pub use range::PriceRange;

use crate::domain::Leg;
use crate::error::PayoffResult;

/// 레그 집합의 만기 손익 곡선을 계산합니다.
///
/// 각 샘플 가격 `S`에서 모든 레그의 `sign(action) * quantity * intrinsic(S)`를
/// 합산합니다. 부동소수점 연산만 사용하며 반올림하지 않습니다.
///
/// # Errors
/// `range`가 유효하지 않으면 (`start >= end`, `steps < 2`)
/// `PayoffError::InvalidRange`를 반환합니다.
///
/// # 예제
///
/// ```
/// use optionforge_core::{compute_payoff, Leg, PriceRange, Side};
///
/// let legs = vec![
///     Leg::call(Side::Buy, 1, 150.0).unwrap(),
///     Leg::call(Side::Sell, 1, 155.0).unwrap(),
/// ];
/// let range = PriceRange::new(125.0, 175.0, 101).unwrap();
/// let curve = compute_payoff(&legs, &range).unwrap();
///
/// assert_eq!(curve.value_at(160.0), Some(5.0));
/// ```
pub fn compute_payoff(legs: &[Leg], range: &PriceRange) -> PayoffResult<PayoffCurve> {
    range.validate()?;

    let points = range
        .prices()
        .map(|price| PayoffPoint {
            underlying_price: price,
            profit_loss: legs
                .iter()
                .fold(0.0, |total, leg| total + leg.payoff_at(price)),
        })
        .collect();

    Ok(PayoffCurve::from_points(points))
}
