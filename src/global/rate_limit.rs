//! IP 기반 요청 한도 미들웨어

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use tokio::task::JoinHandle;

use crate::error::AppError;

/// 상태 정리 주기 기본값 (1분)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// 클라이언트 IP별 Rate Limiter
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>>;

/// 분당 허용 요청 수로 Limiter 생성 (0은 1로 취급)
pub fn create_ip_rate_limiter(per_minute: u32) -> IpRateLimiter {
    let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute)))
}

/// 요청 한도 미들웨어 상태
#[derive(Clone)]
pub struct IpRateLimit {
    limiter: IpRateLimiter,
    /// 프록시 뒤에서만 켜야 합니다. 꺼져 있으면 접속 주소만 사용합니다.
    trust_forwarded_for: bool,
}

impl IpRateLimit {
    pub fn new(limiter: IpRateLimiter, trust_forwarded_for: bool) -> Self {
        Self {
            limiter,
            trust_forwarded_for,
        }
    }

    pub fn limiter(&self) -> &IpRateLimiter {
        &self.limiter
    }
}

/// 오래된 IP 상태를 주기적으로 정리하는 백그라운드 작업 시작
///
/// 한도가 모두 회복된 키는 새 키와 구분되지 않으므로 제거해도 동작이 같습니다.
pub fn spawn_rate_limit_cleanup(limiter: IpRateLimiter, interval: Duration) -> JoinHandle<()> {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting rate limiter cleanup task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 시작 직후에는 정리할 것이 없음
        ticker.tick().await;

        loop {
            ticker.tick().await;
            prune(&limiter);
        }
    })
}

fn prune(limiter: &IpRateLimiter) {
    let before = limiter.len();
    limiter.retain_recent();
    limiter.shrink_to_fit();
    let after = limiter.len();

    if before != after {
        tracing::debug!(
            removed = before.saturating_sub(after),
            remaining = after,
            "Pruned rate limiter state"
        );
    }
}

/// 요청 한도 검사
///
/// `x-forwarded-for`는 신뢰 설정이 켜진 경우에만 사용합니다.
/// 클라이언트 주소를 알 수 없으면 검사하지 않습니다.
pub async fn ip_rate_limit(
    State(guard): State<IpRateLimit>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let Some(ip) = client_ip(request.headers(), peer, guard.trust_forwarded_for) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    match guard.limiter.check_key(&ip) {
        Ok(_) => Ok(next.run(request).await),
        Err(negative) => {
            let wait = negative.wait_time_from(DefaultClock::default().now());
            tracing::warn!(client_ip = %ip, retry_after_secs = wait.as_secs(), "Rate limit exceeded");
            Err(AppError::RateLimitExceeded(Some(wait.as_secs().max(1))))
        }
    }
}

fn client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if !trust_forwarded_for {
        return peer;
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .or(peer)
}
