pub mod middleware;
pub mod rate_limit;
pub mod validator;

pub use middleware::{request_tracing, REQUEST_ID_HEADER};
pub use rate_limit::{
    create_ip_rate_limiter, ip_rate_limit, spawn_rate_limit_cleanup, IpRateLimit, IpRateLimiter,
    DEFAULT_CLEANUP_INTERVAL,
};
pub use validator::{require_api_key, SecretKeyValidator, API_KEY_HEADER};
