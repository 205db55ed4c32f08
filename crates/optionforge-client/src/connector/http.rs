//! REST 백테스트 서비스 커넥터.
//!
//! 엔드포인트:
//! - `POST /strategies/{id}/backtests` (ID 없는 전략은 `POST /backtests`)
//! - `GET /backtests/{id}/status`
//! - `GET /backtests/{id}/results` (미완료 시 404)

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use optionforge_core::{BacktestRequest, BacktestResult, JobId, JobStatus, Leg, ServiceConfig};

use crate::traits::{BacktestService, JobTicket, ServiceResult, StatusReport};
use crate::ServiceError;

// ============================================================================
// 요청/응답 형식
// ============================================================================

#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    start_date: NaiveDate,
    end_date: NaiveDate,
    name: &'a str,
    legs: &'a [Leg],
}

/// 서비스가 정수 또는 문자열로 내려주는 ID.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(u64),
    Str(String),
}

impl From<RawId> for JobId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(id) => JobId::from(id),
            RawId::Str(id) => JobId::from(id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    backtest_id: RawId,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    /// 작업 큐 상태 (PENDING, STARTED, PROGRESS, SUCCESS, FAILURE)
    #[serde(default)]
    status: Option<String>,
    /// 서비스 DB 상태 (우선 적용)
    #[serde(default)]
    db_status: Option<String>,
    #[serde(default)]
    info: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl StatusResponse {
    fn into_report(self) -> ServiceResult<StatusReport> {
        let status = match (&self.db_status, &self.status) {
            (Some(db), _) => db.parse::<JobStatus>().map_err(ServiceError::Parse)?,
            (None, Some(queue)) => queue_state_to_status(queue)?,
            (None, None) => {
                return Err(ServiceError::Parse(
                    "status response has neither db_status nor status".to_string(),
                ))
            }
        };

        let detail = self.info.and_then(|info| match info {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        Ok(StatusReport { status, detail })
    }
}

/// 작업 큐 상태를 작업 상태로 변환.
fn queue_state_to_status(state: &str) -> ServiceResult<JobStatus> {
    match state {
        "PENDING" | "RECEIVED" => Ok(JobStatus::Pending),
        "STARTED" | "PROGRESS" | "RETRY" => Ok(JobStatus::Running),
        "SUCCESS" => Ok(JobStatus::Completed),
        "FAILURE" | "REVOKED" => Ok(JobStatus::Failed),
        other => Err(ServiceError::Parse(format!("Unknown task state: {}", other))),
    }
}

// ============================================================================
// HTTP 클라이언트
// ============================================================================

/// REST 백테스트 서비스 클라이언트.
pub struct HttpBacktestService {
    config: ServiceConfig,
    client: Client,
}

impl HttpBacktestService {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ServiceError::Network`를 반환합니다.
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// 인증 토큰이 있으면 Bearer 헤더를 추가.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ServiceError::Parse(e.to_string())
            });
        }

        // 에러 응답의 message 필드 추출 시도
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ServiceError::Unauthorized(message))
            }
            _ => Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl BacktestService for HttpBacktestService {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit_backtest(&self, request: &BacktestRequest) -> ServiceResult<JobTicket> {
        let path = match &request.strategy.id {
            Some(id) => format!("/strategies/{}/backtests", id),
            None => "/backtests".to_string(),
        };
        let url = self.url(&path);
        let body = SubmitBody {
            start_date: request.start_date,
            end_date: request.end_date,
            name: &request.strategy.name,
            legs: &request.strategy.legs,
        };

        debug!("POST {}", url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let resp: SubmitResponse = Self::handle_response(response).await?;

        let job_id = JobId::from(resp.backtest_id);
        info!(
            job_id = %job_id,
            strategy = %request.strategy.name,
            service_message = resp.message.as_deref().unwrap_or(""),
            "Backtest submitted"
        );

        Ok(JobTicket {
            job_id,
            status: JobStatus::Pending,
        })
    }

    async fn get_status(&self, job_id: &JobId) -> ServiceResult<StatusReport> {
        let resp: StatusResponse = self
            .get_json(&format!("/backtests/{}/status", job_id))
            .await?;
        resp.into_report()
    }

    async fn get_result(&self, job_id: &JobId) -> ServiceResult<BacktestResult> {
        match self
            .get_json::<BacktestResult>(&format!("/backtests/{}/results", job_id))
            .await
        {
            Err(ServiceError::Api { status: 404, .. }) => Err(ServiceError::NotReady),
            other => other,
        }
    }
}
