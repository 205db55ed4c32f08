//! 백테스트 작업 추적기.
//!
//! 백테스트 요청을 제출하고, 작업이 최종 상태에 도달할 때까지 주기적으로 상태를
//! 조회한 뒤 결과 또는 실패를 노출합니다.
//!
//! # 동시성
//!
//! - 추적기 하나당 폴링 루프는 최대 하나만 실행됩니다. 새 제출은 이전 루프를 먼저 취소합니다.
//! - 상태 전이는 하나의 태스크에서 순차적으로 일어납니다.
//! - `cancel()` 또는 drop 시 타이머와 진행 중인 요청이 즉시 중단되며, 이후 스냅샷은
//!   변경되지 않습니다.

mod driver;
mod state;

pub use state::{transition, TrackerEvent};

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use optionforge_core::{BacktestJob, BacktestRequest, JobId, TrackerConfig};

use crate::traits::BacktestService;
use driver::JobDriver;

/// 실행 중인 폴링 태스크.
struct ActivePoll {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// 백테스트 작업 추적기.
///
/// 스냅샷은 상태가 전이될 때마다 새로 발행되며 `snapshot()` 또는
/// `subscribe()`로 관찰할 수 있습니다.
///
/// `submit`/`attach`는 Tokio 런타임 안에서 호출해야 합니다.
pub struct BacktestTracker {
    service: Arc<dyn BacktestService>,
    config: TrackerConfig,
    snapshot: Arc<watch::Sender<BacktestJob>>,
    active: Option<ActivePoll>,
}

impl BacktestTracker {
    /// 새 추적기 생성.
    pub fn new(service: Arc<dyn BacktestService>, config: TrackerConfig) -> Self {
        let (snapshot, _) = watch::channel(BacktestJob::submitting());

        Self {
            service,
            config,
            snapshot: Arc::new(snapshot),
            active: None,
        }
    }

    /// 백테스트를 제출하고 완료될 때까지 폴링을 시작합니다.
    ///
    /// 이전 작업의 폴링은 먼저 취소됩니다.
    pub fn submit(&mut self, request: BacktestRequest) {
        info!(
            service = self.service.name(),
            strategy = %request.strategy.name,
            legs = request.strategy.legs.len(),
            "Submitting backtest"
        );

        let span = tracing::info_span!("backtest", strategy = %request.strategy.name);
        let driver = self.prepare(BacktestJob::submitting());
        self.spawn(driver, |driver| driver.run_submission(request).instrument(span));
    }

    /// 이미 제출된 작업을 추적합니다.
    ///
    /// 결과를 먼저 조회하고, 아직 준비되지 않았으면 `Pending`으로 두고 폴링합니다.
    pub fn attach(&mut self, job_id: JobId) {
        info!(service = self.service.name(), job_id = %job_id, "Attaching to backtest");

        let span = optionforge_core::job_span!("backtest", job_id);
        let initial = BacktestJob {
            id: Some(job_id.clone()),
            ..BacktestJob::submitting()
        };
        let driver = self.prepare(initial);
        self.spawn(driver, |driver| driver.run_attach(job_id).instrument(span));
    }

    /// 폴링을 즉시 중단합니다.
    ///
    /// 진행 중인 요청은 버려지고 스냅샷은 취소 시점 상태로 유지됩니다.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
            if !active.handle.is_finished() {
                info!("Backtest polling cancelled");
            }
        }
    }

    /// 현재 스냅샷.
    pub fn snapshot(&self) -> BacktestJob {
        self.snapshot.borrow().clone()
    }

    /// 스냅샷 변경 구독.
    pub fn subscribe(&self) -> watch::Receiver<BacktestJob> {
        self.snapshot.subscribe()
    }

    /// 폴링 태스크가 실행 중인지 확인.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// 작업이 최종 상태에 도달할 때까지 대기합니다.
    ///
    /// 취소된 작업은 최종 상태에 도달하지 않으므로 반환되지 않습니다.
    pub async fn wait_for_terminal(&self) -> BacktestJob {
        let mut rx = self.snapshot.subscribe();
        let job = match rx.wait_for(BacktestJob::is_terminal).await {
            Ok(job) => (*job).clone(),
            Err(_) => self.snapshot(),
        };
        job
    }

    fn prepare(&mut self, initial: BacktestJob) -> JobDriver {
        self.cancel();
        self.snapshot.send_replace(initial.clone());

        JobDriver::new(
            Arc::clone(&self.service),
            Arc::clone(&self.snapshot),
            CancellationToken::new(),
            &self.config,
            initial,
        )
    }

    fn spawn<F, Fut>(&mut self, driver: JobDriver, run: F)
    where
        F: FnOnce(JobDriver) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = driver.token();
        let handle = tokio::spawn(run(driver));
        self.active = Some(ActivePoll { token, handle });
    }
}

impl Drop for BacktestTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}
