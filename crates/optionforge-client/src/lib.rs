//! 백테스트 서비스 연결 및 작업 추적.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - BacktestService trait: 외부 백테스트 서비스 인터페이스
//! - HTTP 커넥터 (REST + JSON)
//! - BacktestTracker: 제출 → 폴링 → 결과 조회 상태 머신

pub mod connector;
pub mod error;
pub mod tracker;
pub mod traits;

pub use connector::HttpBacktestService;
pub use error::*;
pub use tracker::{transition, BacktestTracker, TrackerEvent};
pub use traits::*;
