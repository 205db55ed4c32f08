//! 저장소에 포함된 설정/전략 파일 검증.

use optionforge_cli::commands::payoff::{resolve_range, PayoffCliConfig};
use optionforge_cli::commands::strategy_file::load_strategy;
use optionforge_core::{compute_payoff, AppConfig};

#[test]
fn test_default_config_loads() {
    let config = AppConfig::load("../../config/default.toml").expect("default config");

    assert_eq!(config.tracker.poll_interval_ms, 5_000);
    assert_eq!(config.preview.steps, 101);
    assert!(config.service.base_url.ends_with("/api"));
}

#[test]
fn test_bull_call_spread_preview() {
    let config = AppConfig::load("../../config/default.toml").expect("default config");
    let strategy =
        load_strategy("../../config/strategies/bull_call_spread.toml").expect("strategy file");

    let range = resolve_range(&strategy, &PayoffCliConfig::default(), &config.preview).unwrap();
    let curve = compute_payoff(&strategy.legs, &range).unwrap();

    let max_profit = curve.max_profit().unwrap();
    let max_loss = curve.max_loss().unwrap();
    assert!((max_profit.profit_loss - 5.0).abs() < 1e-9);
    assert!(max_loss.profit_loss.abs() < 1e-9);
}

#[test]
fn test_iron_condor_preview() {
    let strategy =
        load_strategy("../../config/strategies/iron_condor.json").expect("strategy file");
    assert_eq!(strategy.legs.len(), 4);

    let config = PayoffCliConfig {
        start: Some(80.0),
        end: Some(120.0),
        steps: Some(41),
        ..Default::default()
    };
    let range = resolve_range(&strategy, &config, &AppConfig::default().preview).unwrap();
    let curve = compute_payoff(&strategy.legs, &range).unwrap();

    assert_eq!(curve.value_at(100.0), Some(0.0));
    assert_eq!(curve.value_at(80.0), Some(-5.0));
    assert_eq!(curve.value_at(120.0), Some(-5.0));
}
