//! 옵션 전략 및 백테스트를 위한 도메인 모델.

mod backtest;
mod leg;
mod strategy;

pub use backtest::*;
pub use leg::*;
pub use strategy::*;
