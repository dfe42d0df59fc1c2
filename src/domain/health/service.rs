use std::sync::OnceLock;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use super::dto::{CheckResult, HealthChecks, HealthState, HealthStatus};
use crate::domain::ai::AiService;

/// 서버 시작 시간 (전역)
static START_TIME: OnceLock<Instant> = OnceLock::new();

/// 헬스체크 타임아웃 (5초)
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Degraded 상태 임계값 (2초)
const DEGRADED_THRESHOLD: Duration = Duration::from_secs(2);

/// 서버 시작 시간 초기화
///
/// main 함수에서 서버 시작 시 호출해야 합니다.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// 서버 가동 시간(초) 반환
pub fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// 전체 헬스 체크 수행
///
/// 매 요청마다 Gemini를 직접 호출하며 결과를 저장하지 않습니다.
pub async fn check_health(ai_service: &AiService) -> HealthStatus {
    let gemini_check = check_gemini(ai_service).await;

    HealthStatus {
        status: determine_health_state(&gemini_check),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime_secs(),
        checks: HealthChecks {
            gemini_api: gemini_check,
        },
    }
}

fn determine_health_state(check: &CheckResult) -> HealthState {
    if !check.status {
        return HealthState::Unhealthy;
    }

    match check.latency_ms {
        Some(latency) if latency >= DEGRADED_THRESHOLD.as_millis() as u64 => HealthState::Degraded,
        _ => HealthState::Healthy,
    }
}

/// Gemini 텍스트 생성 검증
async fn check_gemini(ai_service: &AiService) -> CheckResult {
    let start = Instant::now();

    let result = timeout(HEALTH_CHECK_TIMEOUT, ai_service.health_check()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(_)) => {
            tracing::info!(latency_ms, "Gemini health check passed");
            CheckResult::success(latency_ms)
        }
        Ok(Err(e)) => {
            tracing::warn!(latency_ms, error = %e, "Gemini health check failed");
            // 공개 응답에는 업스트림 상세를 싣지 않음
            CheckResult::failure(latency_ms, e.client_message())
        }
        Err(_) => {
            tracing::warn!("Gemini health check timed out");
            CheckResult::timeout(HEALTH_CHECK_TIMEOUT.as_millis() as u64)
        }
    }
}
