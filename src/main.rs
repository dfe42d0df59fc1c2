use std::net::SocketAddr;
use std::process::ExitCode;

use message_responder::{
    config::AppConfig,
    create_router,
    domain::health::init_start_time,
    global::{spawn_rate_limit_cleanup, DEFAULT_CLEANUP_INTERVAL},
    logging::{init_logging, LogFormat},
    monitoring::install_recorder,
    shutdown::shutdown_signal,
    AiService, ApiGuards, AppState, GeminiClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화
    init_logging(LogFormat::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_start_time();

    // 3. 설정 로드
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.gemini.model,
        safety_threshold = config.safety.harassment.as_str(),
        rate_limit_per_minute = config.rate_limit_per_minute,
        trust_forwarded_for = config.trust_forwarded_for,
        api_key_required = config.app_secret_key.is_some(),
        "Configuration loaded"
    );

    // 4. 상태 구성
    let client = GeminiClient::new(config.gemini.clone())?;
    let state = AppState {
        ai_service: AiService::new(client, config.safety),
        metrics: Some(install_recorder()?),
    };
    let guards = ApiGuards::from_config(&config);
    let background: Vec<_> = guards
        .rate_limit
        .iter()
        .map(|rate_limit| {
            spawn_rate_limit_cleanup(rate_limit.limiter().clone(), DEFAULT_CLEANUP_INTERVAL)
        })
        .collect();

    // 5. 서버 실행
    let app = create_router(state, guards);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(background))
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
