//! 백테스트 명령어.
//!
//! 전략을 백테스트 서비스에 제출하고 완료될 때까지 상태를 추적합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전략 파일로 백테스트 제출 후 대기
//! optionforge backtest -s config/strategies/bull_call_spread.toml -f 2024-01-02 -t 2024-06-28
//!
//! # 이미 제출된 작업 대기
//! optionforge backtest --attach 42
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use optionforge_client::{BacktestTracker, HttpBacktestService};
use optionforge_core::{
    AppConfig, BacktestError, BacktestJob, BacktestRequest, BacktestResult, JobId, JobStatus,
};

use super::strategy_file::{load_strategy, parse_date};

/// 백테스트 대상
#[derive(Debug, Clone)]
pub enum BacktestTarget {
    /// 새 백테스트 제출
    Submit {
        strategy_path: String,
        from: String,
        to: String,
    },
    /// 기존 작업 추적
    Attach(String),
}

/// 백테스트 실행.
///
/// 최종 상태의 작업을 반환합니다. Ctrl-C로 중단하면 에러를 반환합니다.
pub async fn run_backtest(target: BacktestTarget, config: &AppConfig) -> Result<BacktestJob> {
    let service = HttpBacktestService::new(config.service.clone())
        .map_err(|e| anyhow!("Failed to create backtest client: {}", e))?;
    let mut tracker = BacktestTracker::new(Arc::new(service), config.tracker.clone());

    match target {
        BacktestTarget::Submit {
            strategy_path,
            from,
            to,
        } => {
            let strategy = load_strategy(&strategy_path)?;
            let request = BacktestRequest::new(strategy, parse_date(&from)?, parse_date(&to)?)?;
            info!(
                "Running backtest for {} ({} ~ {})",
                request.strategy.name, request.start_date, request.end_date
            );
            tracker.submit(request);
        }
        BacktestTarget::Attach(id) => tracker.attach(JobId::new(id)),
    }

    let mut rx = tracker.subscribe();
    tokio::select! {
        job = follow(&mut rx) => Ok(job),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracker.cancel();
            let job = tracker.snapshot();
            warn!(status = %job.status, "Backtest tracking interrupted");
            Err(anyhow!(
                "Interrupted while job {} was {}",
                job.id.as_ref().map(JobId::as_str).unwrap_or("-"),
                job.status
            ))
        }
    }
}

/// 스냅샷 변경을 출력하며 최종 상태까지 대기
async fn follow(rx: &mut watch::Receiver<BacktestJob>) -> BacktestJob {
    loop {
        let job = rx.borrow_and_update().clone();
        print_progress(&job);
        if job.is_terminal() {
            return job;
        }
        if rx.changed().await.is_err() {
            return job;
        }
    }
}

fn print_progress(job: &BacktestJob) {
    let id = job.id.as_ref().map(JobId::as_str).unwrap_or("-");
    match &job.detail {
        Some(detail) if job.status.is_active() => {
            println!("  [{}] {} - {}", id, job.status, detail)
        }
        _ => println!("  [{}] {}", id, job.status),
    }
}

/// 최종 결과 출력
pub fn print_report(job: &BacktestJob) {
    match (job.status, &job.result, &job.error) {
        (JobStatus::Completed, Some(result), _) => print_result(result),
        (_, _, Some(error)) => {
            println!("\n❌ {}", failure_summary(error));
            // 통신 실패는 작업이 서버에서 계속 실행 중일 수 있음
            if let (false, Some(id)) = (error.is_job_failure(), &job.id) {
                println!("  다시 확인: optionforge backtest --attach {}", id);
            }
        }
        _ => println!("\n백테스트 상태: {}", job.status),
    }
}

/// 실패 요약. 백엔드 실행 실패와 통신 실패를 구분합니다.
fn failure_summary(error: &BacktestError) -> String {
    if error.is_job_failure() {
        format!("백테스트 실행 실패: {}", error.message())
    } else {
        format!("서비스 통신 실패 ({}): {}", error.kind(), error.message())
    }
}

fn print_result(result: &BacktestResult) {
    println!("\n📊 백테스트 결과");
    println!("═══════════════════════════════════════════════════════════════");
    for (name, value) in &result.summary_metrics {
        println!("  {:<24} {}", name, value);
    }
    println!("  ─────────────────────────────────────────────────────────────");
    println!("  거래일 수: {}", result.daily_pnl.len());
    if let (Some(first), Some(last)) = (result.daily_pnl.first(), result.daily_pnl.last()) {
        println!("  기간: {} ~ {}", first.date, last.date);
    }
    if let Some(pnl) = result.final_pnl() {
        println!("  최종 손익: {:.2}", pnl);
    }
    println!("═══════════════════════════════════════════════════════════════");
}
