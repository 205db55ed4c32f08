//! OptionForge CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 만기 손익 미리보기
//! optionforge payoff -s config/strategies/bull_call_spread.toml
//!
//! # 범위 지정 후 CSV 저장
//! optionforge payoff -s config/strategies/iron_condor.json --start 80 --end 120 -o payoff.csv
//!
//! # 백테스트 제출 후 완료까지 대기
//! optionforge backtest -s config/strategies/bull_call_spread.toml -f 2024-01-02 -t 2024-06-28
//!
//! # 이미 제출된 백테스트 대기
//! optionforge backtest --attach 42
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use optionforge_cli::commands::backtest::{print_report, run_backtest, BacktestTarget};
use optionforge_cli::commands::payoff::{run_payoff, PayoffCliConfig};
use optionforge_core::{init_logging, AppConfig, JobStatus, LogConfig};

#[derive(Parser)]
#[command(name = "optionforge")]
#[command(about = "OptionForge CLI - 옵션 전략 손익 분석 및 백테스트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 만기 손익 곡선 미리보기
    Payoff {
        /// 전략 파일 (TOML 또는 JSON)
        #[arg(short, long)]
        strategy: String,

        /// 기초자산 가격 범위 시작
        #[arg(long)]
        start: Option<f64>,

        /// 기초자산 가격 범위 끝
        #[arg(long)]
        end: Option<f64>,

        /// 샘플 개수 (2 이상)
        #[arg(long)]
        steps: Option<usize>,

        /// CSV 출력 파일 경로
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 백테스트 제출 및 결과 대기
    Backtest {
        /// 전략 파일 (TOML 또는 JSON)
        #[arg(short, long, required_unless_present = "attach")]
        strategy: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long, requires = "strategy")]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long, requires = "strategy")]
        to: Option<String>,

        /// 이미 제출된 백테스트 ID
        #[arg(long, conflicts_with = "strategy")]
        attach: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일은 없어도 됨
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config))?;

    init_logging(&LogConfig::resolve(&config.logging))?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Payoff {
            strategy,
            start,
            end,
            steps,
            output,
        } => {
            let payoff_config = PayoffCliConfig {
                strategy_path: strategy,
                start,
                end,
                steps,
                output_path: output,
            };

            if let Err(e) = run_payoff(&payoff_config, &config.preview) {
                error!("Payoff preview failed: {:#}", e);
                return Err(e);
            }
        }

        Commands::Backtest {
            strategy,
            from,
            to,
            attach,
        } => {
            let target = match (attach, strategy) {
                (Some(id), _) => BacktestTarget::Attach(id),
                (None, Some(strategy_path)) => BacktestTarget::Submit {
                    strategy_path,
                    from: from.ok_or_else(|| anyhow!("--from is required when submitting"))?,
                    to: to.ok_or_else(|| anyhow!("--to is required when submitting"))?,
                },
                (None, None) => return Err(anyhow!("Either --strategy or --attach is required")),
            };

            let job = run_backtest(target, &config).await?;
            print_report(&job);

            if job.status != JobStatus::Completed {
                return Err(anyhow!("Backtest did not complete: {}", job.status));
            }
        }
    }

    Ok(())
}
