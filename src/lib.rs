pub mod config;
pub mod domain;
pub mod error;
pub mod global;
pub mod logging;
pub mod monitoring;
pub mod response;
pub mod shutdown;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub use domain::ai::{
    AiClient, AiClientTrait, AiService, GeminiClient, GeminiConfig, SafetySettings,
};
pub use global::{IpRateLimit, IpRateLimiter, SecretKeyValidator};

use config::AppConfig;
use domain::ai::dto::{
    ComposeRequest, EmailDraft, GreetingRequest, GreetingResponse, ReplyRequest, ReplyResponse,
};
use domain::ai::template::MessageType;
use domain::health::dto::{CheckResult, HealthChecks, HealthState, HealthStatus};
use response::{BaseResponse, ErrorResponse};

/// 애플리케이션 상태
///
/// 요청 간에 공유되는 값은 모두 불변입니다.
#[derive(Clone)]
pub struct AppState {
    pub ai_service: AiService,
    pub metrics: Option<PrometheusHandle>,
}

/// 라우트 앞단 보호 설정
#[derive(Clone, Default)]
pub struct ApiGuards {
    /// 설정 시 `/api/ai/*`에 `x-api-key` 검증
    pub api_key: Option<SecretKeyValidator>,
    /// 설정 시 `/api/ai/*`와 `/health`에 IP별 요청 한도 적용
    pub rate_limit: Option<IpRateLimit>,
}

impl ApiGuards {
    /// 운영 설정으로 보호 설정 구성
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.app_secret_key.clone().map(SecretKeyValidator::new),
            rate_limit: Some(IpRateLimit::new(
                global::create_ip_rate_limiter(config.rate_limit_per_minute),
                config.trust_forwarded_for,
            )),
        }
    }
}

/// OpenAPI 문서 정의
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Message Responder API",
        version = "0.1.0",
        description = "Gemini 기반 인사말, 이메일 변환, 이메일 답장 생성 API"
    ),
    paths(
        domain::ai::handler::greet,
        domain::ai::handler::compose_email,
        domain::ai::handler::reply_email,
        domain::health::handler::health_check,
    ),
    components(
        schemas(
            GreetingRequest,
            GreetingResponse,
            ComposeRequest,
            EmailDraft,
            ReplyRequest,
            ReplyResponse,
            MessageType,
            BaseResponse<GreetingResponse>,
            BaseResponse<EmailDraft>,
            BaseResponse<ReplyResponse>,
            ErrorResponse,
            HealthStatus,
            HealthState,
            HealthChecks,
            CheckResult,
            WelcomeResponse,
        )
    ),
    tags(
        (name = "AI", description = "AI 메시지 생성 API"),
        (name = "Health", description = "헬스체크 API")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    #[schema(example = "Welcome to the AI Message Response System")]
    pub message: &'static str,
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the AI Message Response System",
    })
}

/// 라우터 생성
pub fn create_router(state: AppState, guards: ApiGuards) -> Router {
    let mut ai_routes = Router::new()
        .route("/api/ai/greeting", post(domain::ai::handler::greet))
        .route("/api/ai/message", post(domain::ai::handler::compose_email))
        .route("/api/ai/reply", post(domain::ai::handler::reply_email))
        .route_layer(middleware::from_fn_with_state(
            guards.api_key,
            global::require_api_key,
        ));

    // `/health`도 매번 Gemini를 호출하므로 같은 한도를 적용
    let mut health_routes = Router::new().route("/health", get(domain::health::health_check));

    // 나중에 추가한 레이어가 먼저 실행되므로 한도 검사가 키 검증보다 앞섭니다
    if let Some(rate_limit) = guards.rate_limit {
        ai_routes = ai_routes.route_layer(middleware::from_fn_with_state(
            rate_limit.clone(),
            global::ip_rate_limit,
        ));
        health_routes = health_routes.route_layer(middleware::from_fn_with_state(
            rate_limit,
            global::ip_rate_limit,
        ));
    }

    Router::new()
        .route("/", get(welcome))
        .route("/metrics", get(monitoring::render_metrics))
        .merge(health_routes)
        .merge(ai_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // CorsLayer는 TraceLayer 안쪽에 있어야 합니다 (응답 본문 타입 제약)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(global::request_tracing)),
        )
        .with_state(state)
}

/// 테스트용 라우터 생성 (Mock AI 클라이언트 주입)
///
/// 요청 한도와 메트릭 레코더는 적용하지 않습니다.
pub fn create_test_router_with_mock<C>(secret_key: Option<&str>, client: C) -> Router
where
    C: AiClientTrait + 'static,
{
    let state = AppState {
        ai_service: AiService::new(client, SafetySettings::default()),
        metrics: None,
    };
    let guards = ApiGuards {
        api_key: secret_key.map(|key| SecretKeyValidator::new(key.to_string())),
        rate_limit: None,
    };

    create_router(state, guards)
}
