//! 옵션 레그 타입.
//!
//! 이 모듈은 전략을 구성하는 단일 옵션 포지션을 정의합니다:
//! - `OptionType` - 콜/풋
//! - `Side` - 포지션 방향 (매수/매도)
//! - `Leg` - 검증된 불변 옵션 포지션

use serde::{Deserialize, Serialize};

use crate::error::{PayoffError, PayoffResult};

/// 옵션 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// 콜 옵션
    Call,
    /// 풋 옵션
    Put,
}

impl OptionType {
    /// 만기 시점의 내재가치를 계산합니다.
    ///
    /// - 콜: `max(0, S - K)`
    /// - 풋: `max(0, K - S)`
    pub fn intrinsic_value(&self, strike: f64, underlying: f64) -> f64 {
        match self {
            OptionType::Call => (underlying - strike).max(0.0),
            OptionType::Put => (strike - underlying).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

/// 포지션 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 페이오프 부호 (매수 +1, 매도 -1).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 전략 내 단일 옵션 포지션.
///
/// `Leg::new`를 통해서만 생성되며 생성 후 변경할 수 없습니다.
/// 역직렬화 시에도 동일한 검증을 거칩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LegSpec")]
pub struct Leg {
    #[serde(rename = "type")]
    option_type: OptionType,
    action: Side,
    quantity: u32,
    strike: f64,
}

/// 검증 전 레그 입력 형식.
#[derive(Debug, Deserialize)]
struct LegSpec {
    #[serde(rename = "type", alias = "option_type")]
    option_type: OptionType,
    action: Side,
    quantity: u32,
    strike: f64,
}

impl TryFrom<LegSpec> for Leg {
    type Error = PayoffError;

    fn try_from(spec: LegSpec) -> PayoffResult<Self> {
        Leg::new(spec.option_type, spec.action, spec.quantity, spec.strike)
    }
}

impl Leg {
    /// 새 레그를 생성합니다.
    ///
    /// # Errors
    /// 수량이 0이거나 행사가가 양의 유한수가 아니면 `PayoffError::InvalidLeg`를 반환합니다.
    pub fn new(option_type: OptionType, action: Side, quantity: u32, strike: f64) -> PayoffResult<Self> {
        if quantity == 0 {
            return Err(PayoffError::InvalidLeg(
                "quantity must be greater than 0".to_string(),
            ));
        }
        if !strike.is_finite() || strike <= 0.0 {
            return Err(PayoffError::InvalidLeg(format!(
                "strike must be a positive number, got {}",
                strike
            )));
        }

        Ok(Self {
            option_type,
            action,
            quantity,
            strike,
        })
    }

    /// 콜 레그 생성.
    pub fn call(action: Side, quantity: u32, strike: f64) -> PayoffResult<Self> {
        Self::new(OptionType::Call, action, quantity, strike)
    }

    /// 풋 레그 생성.
    pub fn put(action: Side, quantity: u32, strike: f64) -> PayoffResult<Self> {
        Self::new(OptionType::Put, action, quantity, strike)
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn action(&self) -> Side {
        self.action
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// 기초자산 가격 `underlying`에서 이 레그의 만기 손익.
    ///
    /// `sign(action) * quantity * intrinsic(option_type, strike, S)`
    pub fn payoff_at(&self, underlying: f64) -> f64 {
        self.action.sign()
            * f64::from(self.quantity)
            * self.option_type.intrinsic_value(self.strike, underlying)
    }
}

impl std::fmt::Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x {} {}",
            self.action, self.quantity, self.strike, self.option_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_value() {
        assert_eq!(OptionType::Call.intrinsic_value(100.0, 110.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic_value(100.0, 90.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic_value(100.0, 90.0), 10.0);
        assert_eq!(OptionType::Put.intrinsic_value(100.0, 110.0), 0.0);
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Buy.sign(), 1.0);
        assert_eq!(Side::Sell.sign(), -1.0);
    }

    #[test]
    fn test_leg_validation() {
        assert!(Leg::call(Side::Buy, 0, 100.0).is_err());
        assert!(Leg::call(Side::Buy, 1, 0.0).is_err());
        assert!(Leg::call(Side::Buy, 1, -5.0).is_err());
        assert!(Leg::put(Side::Sell, 1, f64::NAN).is_err());
        assert!(Leg::put(Side::Sell, 3, 42.5).is_ok());
    }

    #[test]
    fn test_leg_payoff() {
        let short_put = Leg::put(Side::Sell, 2, 100.0).unwrap();
        assert_eq!(short_put.payoff_at(95.0), -10.0);
        assert_eq!(short_put.payoff_at(105.0), 0.0);
    }

    #[test]
    fn test_leg_deserialize_validates() {
        let leg: Leg =
            serde_json::from_str(r#"{"type":"call","action":"buy","quantity":1,"strike":150}"#)
                .unwrap();
        assert_eq!(leg.option_type(), OptionType::Call);
        assert_eq!(leg.strike(), 150.0);

        let bad = serde_json::from_str::<Leg>(
            r#"{"type":"put","action":"sell","quantity":0,"strike":150}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_leg_serialize_uses_wire_names() {
        let leg = Leg::call(Side::Sell, 1, 155.0).unwrap();
        let json = serde_json::to_value(leg).unwrap();
        assert_eq!(json["type"], "call");
        assert_eq!(json["action"], "sell");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_leg_display() {
        let leg = Leg::call(Side::Buy, 1, 150.0).unwrap();
        assert_eq!(leg.to_string(), "BUY 1x 150 CALL");
    }
}
