//! 로깅 초기화.
//!
//! 로그는 stderr로 보내 stdout의 손익 요약/CSV 출력과 섞이지 않게 합니다.
//! 필터는 `RUST_LOG`가 있으면 그 값을, 없으면 `logging.level`을 사용합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 사람이 읽기 쉬운 여러 줄 형식
    #[default]
    Pretty,
    /// 로그 수집용 JSON
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 해석된 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 필터 지시어 (예: "info,optionforge_client=debug")
    pub directives: String,
    pub format: LogFormat,
}

impl LogConfig {
    /// 설정 파일 값과 `RUST_LOG`로부터 설정을 만듭니다.
    pub fn resolve(config: &LoggingConfig) -> Self {
        Self::with_override(config, std::env::var("RUST_LOG").ok())
    }

    /// 알 수 없는 형식은 `Pretty`로 처리합니다.
    fn with_override(config: &LoggingConfig, rust_log: Option<String>) -> Self {
        Self {
            directives: rust_log
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| config.level.clone()),
            format: config.format.parse().unwrap_or_default(),
        }
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.directives).map_err(|e| LoggingError::InvalidFilter {
            directives: self.directives.clone(),
            reason: e.to_string(),
        })
    }
}

/// 전역 subscriber를 설치합니다.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        format = ?config.format,
        directives = %config.directives,
        "Logging initialized"
    );
    Ok(())
}

/// `job_id` 필드가 붙은 span.
#[macro_export]
macro_rules! job_span {
    ($name:expr, $job_id:expr) => {
        tracing::info_span!($name, job_id = %$job_id)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, format: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_config_level_used_without_rust_log() {
        let config = LogConfig::with_override(&logging("debug", "json"), None);
        assert_eq!(config.directives, "debug");
        assert_eq!(config.format, LogFormat::Json);

        let blank = LogConfig::with_override(&logging("warn", "xml"), Some("  ".to_string()));
        assert_eq!(blank.directives, "warn");
        assert_eq!(blank.format, LogFormat::Pretty);
    }

    #[test]
    fn test_rust_log_overrides_level() {
        let config = LogConfig::with_override(
            &logging("info", "compact"),
            Some("optionforge_client=trace".to_string()),
        );
        assert_eq!(config.directives, "optionforge_client=trace");
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LogConfig::with_override(&logging("info,optionforge_client=loud", "pretty"), None);
        assert!(matches!(
            config.filter(),
            Err(LoggingError::InvalidFilter { .. })
        ));

        let ok = LogConfig::with_override(&logging("info,optionforge_client=debug", "pretty"), None);
        assert!(ok.filter().is_ok());
    }
}
