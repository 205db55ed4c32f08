//! 백테스트 서비스 커넥터.

pub mod http;

pub use http::HttpBacktestService;
