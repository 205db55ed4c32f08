//! # OptionForge Core
//!
//! 옵션 전략 백테스트 클라이언트의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 옵션 레그 및 전략 타입
//! - 만기 페이오프 계산 엔진
//! - 백테스트 작업 스냅샷 및 결과 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod payoff;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use payoff::{compute_payoff, PayoffCurve, PayoffPoint, PriceRange};
