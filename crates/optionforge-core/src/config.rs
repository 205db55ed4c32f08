//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수 순으로 설정을 덮어씁니다.
//! 환경 변수는 `OPTIONFORGE__SERVICE__BASE_URL`처럼 `OPTIONFORGE` 접두사와
//! `__` 구분자를 사용합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 백테스트 서비스 연결 설정
    pub service: ServiceConfig,
    /// 작업 추적기 설정
    pub tracker: TrackerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 페이오프 미리보기 설정
    pub preview: PreviewConfig,
}

/// 백테스트 서비스 설정.
///
/// # 보안
/// - `Debug` 구현은 `auth_token`을 마스킹합니다.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// Bearer 인증 토큰
    pub auth_token: Option<String>,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "***REDACTED***"),
            )
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

impl ServiceConfig {
    /// 기본 URL을 지정하여 생성.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// 인증 토큰 설정.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 작업 추적기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// 상태 조회 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 전체 폴링 허용 시간 (초, 없으면 무제한)
    pub max_poll_duration_secs: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            max_poll_duration_secs: None,
        }
    }
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_poll_duration(&self) -> Option<Duration> {
        self.max_poll_duration_secs.map(Duration::from_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 페이오프 미리보기 기본값.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// 행사가 범위 바깥 여유 (중간 행사가 대비 %)
    pub padding_pct: f64,
    /// 샘플 개수
    pub steps: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            padding_pct: 20.0,
            steps: 101,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("OPTIONFORGE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tracker.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.tracker.max_poll_duration(), None);
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.preview.steps, 101);
    }

    #[test]
    fn test_debug_masks_token() {
        let service = ServiceConfig::new("http://example.test").with_auth_token("secret-token");
        let debug = format!("{:?}", service);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.service.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [tracker]
            poll_interval_ms = 250
            max_poll_duration_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.tracker.max_poll_duration(), Some(Duration::from_secs(600)));
        assert_eq!(config.logging.level, "info");
    }
}
