//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 전략 파일 로딩 (TOML/JSON)
//! - 페이오프 미리보기
//! - 백테스트 제출 및 대기

pub mod commands;
