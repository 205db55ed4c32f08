//! 작업 상태 전이 함수.
//!
//! ```text
//! Submitting ──[Submitted]──> Pending ⇄ Running ──[ResultReady]──> Completed
//!     │                          │
//!     └──[SubmitFailed]──> Failed <──[PollFailed | ResultFetchFailed
//!                                     | StatusObserved(Failed) | PollTimedOut]
//! ```
//!
//! 최종 상태(`Completed`, `Failed`)에서는 모든 이벤트가 무시됩니다.
//! `Completed`는 결과를 받은 뒤에만 공개되므로 항상 `result`를 가집니다.

use optionforge_core::{BacktestError, BacktestJob, BacktestResult, JobId, JobStatus};

use crate::traits::{JobTicket, StatusReport};

/// 추적기가 관찰하는 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// 제출 성공
    Submitted(JobTicket),
    /// 제출 실패
    SubmitFailed(String),
    /// 상태 조회 응답
    StatusObserved(StatusReport),
    /// 결과 수신
    ResultReady(BacktestResult),
    /// 결과 엔드포인트가 아직 비어 있음
    ResultNotReady,
    /// 결과 조회 실패
    ResultFetchFailed(String),
    /// 상태 조회 요청 실패
    PollFailed(String),
    /// 최대 폴링 시간 초과
    PollTimedOut(String),
}

/// 현재 스냅샷과 이벤트로부터 다음 스냅샷을 계산합니다.
///
/// 순수 함수이며 입력 스냅샷을 변경하지 않습니다.
pub fn transition(job: &BacktestJob, event: TrackerEvent) -> BacktestJob {
    if job.is_terminal() {
        return job.clone();
    }

    match event {
        TrackerEvent::Submitted(ticket) => {
            let status = if ticket.status.is_active() {
                ticket.status
            } else {
                JobStatus::Pending
            };
            active(job, Some(ticket.job_id), status, job.detail.clone())
        }
        TrackerEvent::StatusObserved(report) => match report.status {
            JobStatus::Pending | JobStatus::Running => {
                active(job, job.id.clone(), report.status, report.detail)
            }
            JobStatus::Failed => failed(
                job,
                BacktestError::JobExecution(
                    report
                        .detail
                        .unwrap_or_else(|| "backend reported the backtest as failed".to_string()),
                ),
            ),
            // 완료는 결과를 받은 뒤에만 공개
            JobStatus::Completed | JobStatus::Submitting => job.clone(),
        },
        TrackerEvent::ResultReady(result) => BacktestJob {
            id: job.id.clone(),
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
            detail: job.detail.clone(),
        },
        TrackerEvent::ResultNotReady => match job.status {
            JobStatus::Submitting => active(job, job.id.clone(), JobStatus::Pending, None),
            _ => job.clone(),
        },
        TrackerEvent::SubmitFailed(msg) => failed(job, BacktestError::Submission(msg)),
        TrackerEvent::ResultFetchFailed(msg) => failed(job, BacktestError::ResultFetch(msg)),
        TrackerEvent::PollFailed(msg) => failed(job, BacktestError::Polling(msg)),
        TrackerEvent::PollTimedOut(msg) => failed(job, BacktestError::PollingTimeout(msg)),
    }
}

fn active(job: &BacktestJob, id: Option<JobId>, status: JobStatus, detail: Option<String>) -> BacktestJob {
    BacktestJob {
        id,
        status,
        result: None,
        error: None,
        detail: detail.or_else(|| job.detail.clone()),
    }
}

fn failed(job: &BacktestJob, error: BacktestError) -> BacktestJob {
    BacktestJob {
        id: job.id.clone(),
        status: JobStatus::Failed,
        result: None,
        error: Some(error),
        detail: job.detail.clone(),
    }
}
