//! 백테스트 서비스 에러 타입.

use thiserror::Error;

/// 백테스트 서비스 호출 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API 에러 응답
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 결과가 아직 준비되지 않음 (에러가 아닌 대기 신호)
    #[error("Result not ready")]
    NotReady,

    /// 요청을 만들 수 없음
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// "아직 준비되지 않음" 신호인지 확인.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ServiceError::NotReady)
    }

    /// 재시도 가능한 전송 에러인지 확인.
    ///
    /// 추적기는 자동 재시도하지 않으며, 사용자 안내 메시지에 사용됩니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Network(_) | ServiceError::Timeout(_))
            || matches!(self, ServiceError::Api { status, .. } if *status >= 500)
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ServiceError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else if err.is_builder() {
            ServiceError::InvalidRequest(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Parse(err.to_string())
    }
}
