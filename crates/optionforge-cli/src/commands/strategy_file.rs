//! 전략 파일 로딩.
//!
//! ```toml
//! name = "Bull Call Spread"
//!
//! [[legs]]
//! type = "call"
//! action = "buy"
//! quantity = 1
//! strike = 150.0
//! ```

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use optionforge_core::Strategy;

/// 전략 파일 로드 (`.toml` 또는 `.json`)
pub fn load_strategy(path: impl AsRef<Path>) -> Result<Strategy> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(anyhow!("Strategy file not found: {}", path.display()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read strategy file: {}", path.display()))?;

    let strategy: Strategy = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid strategy file: {}", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid strategy file: {}", path.display()))?,
        _ => {
            return Err(anyhow!(
                "Unsupported strategy format. Use .toml or .json: {}",
                path.display()
            ))
        }
    };

    debug!(name = %strategy.name, legs = strategy.legs.len(), "Loaded strategy");
    Ok(strategy)
}

/// 날짜 문자열 파싱 (YYYY-MM-DD)
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use optionforge_core::{OptionType, Side};

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("optionforge-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_toml_strategy() {
        let path = write_temp(
            "spread.toml",
            r#"
name = "Bull Call Spread"
id = "7"

[[legs]]
type = "call"
action = "buy"
quantity = 1
strike = 150.0

[[legs]]
type = "call"
action = "sell"
quantity = 1
strike = 155.0
"#,
        );

        let strategy = load_strategy(&path).unwrap();
        assert_eq!(strategy.name, "Bull Call Spread");
        assert_eq!(strategy.id.as_deref(), Some("7"));
        assert_eq!(strategy.legs.len(), 2);
        assert_eq!(strategy.legs[1].action(), Side::Sell);
        assert_eq!(strategy.legs[0].option_type(), OptionType::Call);
    }

    #[test]
    fn test_load_json_strategy() {
        let path = write_temp(
            "put.json",
            r#"{"name": "Long Put", "legs": [{"type": "put", "action": "buy", "quantity": 2, "strike": 100}]}"#,
        );

        let strategy = load_strategy(&path).unwrap();
        assert_eq!(strategy.legs[0].quantity(), 2);
        assert!(strategy.id.is_none());
    }

    #[test]
    fn test_invalid_leg_is_rejected() {
        let path = write_temp(
            "bad.json",
            r#"{"name": "Bad", "legs": [{"type": "call", "action": "buy", "quantity": 0, "strike": 100}]}"#,
        );

        assert!(load_strategy(&path).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let path = write_temp("spread.yaml", "name: x");
        let err = load_strategy(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported strategy format"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_strategy("does/not/exist.toml").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 29).unwrap()
        );
        assert!(parse_date("29/03/2024").is_err());
    }
}
