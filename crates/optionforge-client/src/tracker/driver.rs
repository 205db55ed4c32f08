//! 단일 작업의 제출/폴링/결과 조회 루프.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use optionforge_core::{BacktestJob, BacktestRequest, JobId, JobStatus, TrackerConfig};

use super::state::{transition, TrackerEvent};
use crate::traits::BacktestService;
use crate::ServiceError;

/// 취소/마감 시간과 경합한 요청의 결과.
enum Guarded<T> {
    Done(T),
    Cancelled,
    DeadlineExceeded,
}

/// 작업 하나의 생명주기를 소유하는 드라이버.
pub(super) struct JobDriver {
    service: Arc<dyn BacktestService>,
    snapshot: Arc<watch::Sender<BacktestJob>>,
    token: CancellationToken,
    poll_interval: Duration,
    max_poll_duration: Option<Duration>,
    /// 폴링 시작 시각과 마감 시각 (폴링 전에는 없음)
    window: Option<(Instant, Option<Instant>)>,
    state: BacktestJob,
}

impl JobDriver {
    pub(super) fn new(
        service: Arc<dyn BacktestService>,
        snapshot: Arc<watch::Sender<BacktestJob>>,
        token: CancellationToken,
        config: &TrackerConfig,
        initial: BacktestJob,
    ) -> Self {
        Self {
            service,
            snapshot,
            token,
            poll_interval: config.poll_interval(),
            max_poll_duration: config.max_poll_duration(),
            window: None,
            state: initial,
        }
    }

    pub(super) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 제출 후 최종 상태까지 폴링.
    pub(super) async fn run_submission(mut self, request: BacktestRequest) {
        let outcome = match self.guarded(self.service.submit_backtest(&request)).await {
            Guarded::Done(outcome) => outcome,
            Guarded::Cancelled | Guarded::DeadlineExceeded => return,
        };

        match outcome {
            Ok(ticket) => {
                let job_id = ticket.job_id.clone();
                if !self.apply(TrackerEvent::Submitted(ticket)) {
                    self.poll(job_id).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Backtest submission failed");
                self.apply(TrackerEvent::SubmitFailed(e.to_string()));
            }
        }
    }

    /// 기존 작업의 결과를 먼저 조회하고, 준비되지 않았으면 폴링.
    pub(super) async fn run_attach(mut self, job_id: JobId) {
        if !self.fetch_result(&job_id).await {
            self.poll(job_id).await;
        }
    }

    async fn poll(&mut self, job_id: JobId) {
        let start = Instant::now();
        self.window = Some((start, self.max_poll_duration.map(|limit| start + limit)));
        let mut ticker = time::interval_at(start + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls = 0u32;

        loop {
            match self.guarded(ticker.tick()).await {
                Guarded::Done(_) => {}
                Guarded::Cancelled => {
                    debug!(polls, "Polling loop stopped");
                    return;
                }
                Guarded::DeadlineExceeded => {
                    self.time_out(&job_id, polls);
                    return;
                }
            }

            polls += 1;
            debug!(poll = polls, "Querying backtest status");

            let report = match self.guarded(self.service.get_status(&job_id)).await {
                Guarded::Done(Ok(report)) => report,
                Guarded::Done(Err(e)) => {
                    warn!(error = %e, "Backtest status query failed");
                    self.apply(TrackerEvent::PollFailed(e.to_string()));
                    return;
                }
                Guarded::Cancelled => return,
                Guarded::DeadlineExceeded => {
                    self.time_out(&job_id, polls);
                    return;
                }
            };

            // 결과 조회는 같은 작업 ID에서 완료를 관찰한 뒤에만
            let completed = report.status == JobStatus::Completed;
            if self.apply(TrackerEvent::StatusObserved(report)) {
                return;
            }
            if completed && self.fetch_result(&job_id).await {
                return;
            }
        }
    }

    /// 결과를 조회합니다. 더 이상 폴링할 필요가 없으면 `true`.
    async fn fetch_result(&mut self, job_id: &JobId) -> bool {
        match self.guarded(self.service.get_result(job_id)).await {
            Guarded::Done(Ok(result)) => self.apply(TrackerEvent::ResultReady(result)),
            Guarded::Done(Err(ServiceError::NotReady)) => {
                debug!("Backtest result not ready yet");
                self.apply(TrackerEvent::ResultNotReady)
            }
            Guarded::Done(Err(e)) => {
                warn!(error = %e, "Backtest result fetch failed");
                self.apply(TrackerEvent::ResultFetchFailed(e.to_string()))
            }
            Guarded::Cancelled => true,
            Guarded::DeadlineExceeded => {
                self.time_out(job_id, 0);
                true
            }
        }
    }

    fn time_out(&mut self, job_id: &JobId, polls: u32) {
        let elapsed = self
            .window
            .map(|(start, _)| start.elapsed())
            .unwrap_or_default();
        warn!(polls, elapsed_secs = elapsed.as_secs(), "Backtest polling timed out");
        self.apply(TrackerEvent::PollTimedOut(format!(
            "job {} did not finish within {}s",
            job_id,
            elapsed.as_secs()
        )));
    }

    /// 이벤트를 적용하고 변경된 스냅샷을 발행합니다. 최종 상태면 `true`.
    fn apply(&mut self, event: TrackerEvent) -> bool {
        let next = transition(&self.state, event);

        if next != self.state {
            if next.status != self.state.status {
                info!(
                    job_id = next.id.as_ref().map(JobId::as_str).unwrap_or("-"),
                    from = %self.state.status,
                    to = %next.status,
                    "Backtest status changed"
                );
            }
            if let Some(error) = &next.error {
                warn!(kind = error.kind(), error = %error, "Backtest failed");
            }

            let token = &self.token;
            self.snapshot.send_if_modified(|current| {
                // 취소 이후에는 발행하지 않음
                if token.is_cancelled() {
                    return false;
                }
                *current = next.clone();
                true
            });
            self.state = next;
        }

        self.state.is_terminal()
    }

    /// 요청을 취소 및 폴링 마감 시간과 경합시킵니다.
    ///
    /// 취소나 마감이 먼저 오면 진행 중인 요청은 버려집니다.
    async fn guarded<T>(&self, request: impl Future<Output = T>) -> Guarded<T> {
        let deadline = self.window.and_then(|(_, deadline)| deadline);
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Guarded::Cancelled,
            _ = sleep_until_deadline(deadline) => Guarded::DeadlineExceeded,
            out = request => Guarded::Done(out),
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
