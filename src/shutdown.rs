use std::future::Future;

use tokio::signal;
use tokio::task::JoinHandle;

/// 종료를 요청한 시그널
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }
}

/// Graceful shutdown 트리거
///
/// SIGTERM 또는 SIGINT(Ctrl+C)를 받으면 백그라운드 작업(요청 한도 정리 등)을
/// 중단하고 반환합니다. 이후 서버는 진행 중인 요청을 마치고 종료합니다.
pub async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    graceful_shutdown(wait_for_signal(), background).await;
}

async fn graceful_shutdown<F>(signal: F, background: Vec<JoinHandle<()>>)
where
    F: Future<Output = ShutdownSignal>,
{
    let received = signal.await;
    tracing::info!(
        signal = received.as_str(),
        background_tasks = background.len(),
        "Initiating graceful shutdown"
    );

    for task in background {
        task.abort();
    }
}

/// 핸들러 설치에 실패한 시그널은 기다리지 않습니다.
async fn wait_for_signal() -> ShutdownSignal {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    }
}
