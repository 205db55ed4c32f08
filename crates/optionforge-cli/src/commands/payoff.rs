//! 페이오프 미리보기 명령어.
//!
//! 만기 시점 손익 곡선을 계산해 요약을 출력하고, 필요하면 CSV로 저장합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 행사가 주변 자동 범위
//! optionforge payoff -s config/strategies/bull_call_spread.toml
//!
//! # 범위와 샘플 수 지정, CSV 저장
//! optionforge payoff -s spread.toml --start 100 --end 200 --steps 201 -o payoff.csv
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use optionforge_core::{compute_payoff, PayoffCurve, PreviewConfig, PriceRange, Strategy};

use super::strategy_file::load_strategy;

/// 페이오프 CLI 설정
#[derive(Debug, Clone, Default)]
pub struct PayoffCliConfig {
    /// 전략 파일 경로
    pub strategy_path: String,
    /// 범위 시작가 (없으면 행사가 기준 자동)
    pub start: Option<f64>,
    /// 범위 종료가 (없으면 행사가 기준 자동)
    pub end: Option<f64>,
    /// 샘플 개수 (없으면 설정값)
    pub steps: Option<usize>,
    /// CSV 저장 경로
    pub output_path: Option<String>,
}

/// 페이오프 미리보기 실행
pub fn run_payoff(config: &PayoffCliConfig, preview: &PreviewConfig) -> Result<PayoffCurve> {
    let strategy = load_strategy(&config.strategy_path)?;
    let range = resolve_range(&strategy, config, preview)?;

    info!(
        strategy = %strategy.name,
        start = range.start,
        end = range.end,
        steps = range.steps,
        step_size = range.step_size(),
        "Computing payoff curve"
    );

    let curve = compute_payoff(&strategy.legs, &range)?;

    print_summary(&strategy, &curve);

    if let Some(path) = &config.output_path {
        save_to_csv(&curve, path)?;
        println!("저장 위치: {}", path);
    }

    Ok(curve)
}

/// 가격 범위 결정.
///
/// 지정된 경계는 그대로 쓰고, 빠진 경계는 행사가 주변 기본 범위에서 채웁니다.
pub fn resolve_range(
    strategy: &Strategy,
    config: &PayoffCliConfig,
    preview: &PreviewConfig,
) -> Result<PriceRange> {
    let steps = config.steps.unwrap_or(preview.steps);

    if let (Some(start), Some(end)) = (config.start, config.end) {
        return Ok(PriceRange::new(start, end, steps)?);
    }

    let default = PriceRange::around(strategy, preview.padding_pct, steps).ok_or_else(|| {
        anyhow!(
            "Strategy '{}' has no legs; pass both --start and --end",
            strategy.name
        )
    })??;

    Ok(PriceRange::new(
        config.start.unwrap_or(default.start),
        config.end.unwrap_or(default.end),
        steps,
    )?)
}

/// 곡선 요약 출력
pub fn print_summary(strategy: &Strategy, curve: &PayoffCurve) {
    println!("\n📈 {} 만기 손익", strategy.name);
    println!("═══════════════════════════════════════════════════════════════");
    for leg in &strategy.legs {
        println!("  {}", leg);
    }
    println!("  ─────────────────────────────────────────────────────────────");

    match curve.max_profit() {
        Some(point) => println!(
            "  최대 이익: {:>12.2} @ {:.2}",
            point.profit_loss, point.underlying_price
        ),
        None => println!("  최대 이익: -"),
    }
    match curve.max_loss() {
        Some(point) => println!(
            "  최대 손실: {:>12.2} @ {:.2}",
            point.profit_loss, point.underlying_price
        ),
        None => println!("  최대 손실: -"),
    }

    let breakevens = curve.breakevens();
    if breakevens.is_empty() {
        println!("  손익분기점: 없음");
    } else {
        let list: Vec<String> = breakevens.iter().map(|p| format!("{:.2}", p)).collect();
        println!("  손익분기점: {}", list.join(", "));
    }
    println!("═══════════════════════════════════════════════════════════════");
}

/// CSV 파일로 저장
pub fn save_to_csv(curve: &PayoffCurve, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "underlying_price,profit_loss")?;
    for point in curve.points() {
        writeln!(writer, "{},{}", point.underlying_price, point.profit_loss)?;
    }

    writer.flush()?;

    info!("Saved {} payoff points to {}", curve.len(), path.display());

    Ok(curve.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use optionforge_core::{Leg, Side};

    fn debit_spread() -> Strategy {
        Strategy::new("Bull Call Spread")
            .with_leg(Leg::call(Side::Buy, 1, 150.0).unwrap())
            .with_leg(Leg::call(Side::Sell, 1, 155.0).unwrap())
    }

    fn preview() -> PreviewConfig {
        PreviewConfig {
            padding_pct: 20.0,
            steps: 101,
        }
    }

    #[test]
    fn test_explicit_range() {
        let config = PayoffCliConfig {
            start: Some(140.0),
            end: Some(160.0),
            steps: Some(21),
            ..Default::default()
        };

        let range = resolve_range(&debit_spread(), &config, &preview()).unwrap();
        assert_eq!(range.start, 140.0);
        assert_eq!(range.end, 160.0);
        assert_eq!(range.steps, 21);
    }

    #[test]
    fn test_default_range_around_strikes() {
        let range = resolve_range(&debit_spread(), &PayoffCliConfig::default(), &preview()).unwrap();

        assert!(range.start < 150.0);
        assert!(range.end > 155.0);
        assert_eq!(range.steps, 101);
    }

    #[test]
    fn test_partial_range_override() {
        let config = PayoffCliConfig {
            start: Some(145.0),
            ..Default::default()
        };

        let range = resolve_range(&debit_spread(), &config, &preview()).unwrap();
        assert_eq!(range.start, 145.0);
        assert!(range.end > 155.0);
    }

    #[test]
    fn test_empty_strategy_needs_explicit_range() {
        let empty = Strategy::new("Empty");
        assert!(resolve_range(&empty, &PayoffCliConfig::default(), &preview()).is_err());

        let config = PayoffCliConfig {
            start: Some(10.0),
            end: Some(20.0),
            ..Default::default()
        };
        assert!(resolve_range(&empty, &config, &preview()).is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = PayoffCliConfig {
            start: Some(160.0),
            end: Some(140.0),
            ..Default::default()
        };
        assert!(resolve_range(&debit_spread(), &config, &preview()).is_err());
    }

    #[test]
    fn test_save_to_csv() {
        let range = PriceRange::new(140.0, 160.0, 5).unwrap();
        let curve = compute_payoff(&debit_spread().legs, &range).unwrap();

        let path = std::env::temp_dir()
            .join(format!("optionforge-payoff-{}", std::process::id()))
            .join("curve.csv");
        let written = save_to_csv(&curve, &path).unwrap();
        assert_eq!(written, 5);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "underlying_price,profit_loss");
        assert_eq!(lines[1], "140,0");
        assert_eq!(lines[5], "160,5");
    }
}
