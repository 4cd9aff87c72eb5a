use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod benchmarks;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod stats;

use benchmarks::BenchmarkSuite;
use config::Config;
use hub::HubClient;
use parser::{IdentityParser, ParserConfig};

const BANNER: &str = r#"
  ____      _        _
 / ___|__ _| |_ __ _| | ___   __ _
| |   / _` | __/ _` | |/ _ \ / _` |
| |__| (_| | || (_| | | (_) | (_| |
 \____\__,_|\__\__,_|_|\___/ \__, |
                             |___/
      [Distilled model & dataset catalog]
"#;

#[derive(Clone)]
pub struct AppState {
    pub hub: HubClient,
    pub parser: Arc<IdentityParser>,
    pub benchmarks: Arc<BenchmarkSuite>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/huggingface", get(handlers::catalog))
        .route("/api/stats", get(handlers::home_stats))
        .route("/api/models", get(handlers::list_models))
        .route("/api/datasets", get(handlers::list_datasets))
        .route("/api/benchmarks", get(handlers::benchmarks))
        .route("/api/benchmarks/top/:metric", get(handlers::top_performer))
        .route("/api/identity", get(handlers::identity))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("{}", BANNER);

    let config = Config::from_env();
    info!("Hub API        : {}", config.hub_api_base);
    info!("Model authors  : {}", config.model_authors.join(", "));
    info!("Dataset authors: {}", config.dataset_authors.join(", "));
    info!("Cache TTL      : {}s", config.cache_ttl.as_secs());

    let parser = IdentityParser::new(&ParserConfig::default())
        .context("source rule table failed validation")?;
    let benchmarks = BenchmarkSuite::embedded().context("embedded benchmark data is invalid")?;
    info!(
        "Benchmarks     : {} results over {} metrics",
        benchmarks.results.len(),
        benchmarks.metrics.len()
    );

    let hub = HubClient::new(&config).context("failed to build hub client")?;

    let mut scheduler = match &config.refresh_cron {
        Some(cron) => match scheduler::start_scheduler(hub.clone(), cron).await {
            Ok(sched) => {
                info!("Scheduler      : refreshing on '{}'", cron);
                Some(sched)
            }
            Err(e) => {
                warn!("Scheduler      : disabled, {:?}", e);
                None
            }
        },
        None => {
            info!("Scheduler      : disabled");
            None
        }
    };

    let state = AppState {
        hub,
        parser: Arc::new(parser),
        benchmarks: Arc::new(benchmarks),
    };
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sched) = scheduler.as_mut() {
        if let Err(e) = sched.shutdown().await {
            warn!("Scheduler did not stop cleanly: {:?}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let config = Config {
            hub_api_base: "http://127.0.0.1:9/api".to_string(),
            refresh_cron: None,
            ..Config::default()
        };
        AppState {
            hub: HubClient::new(&config).unwrap(),
            parser: Arc::new(IdentityParser::new(&ParserConfig::default()).unwrap()),
            benchmarks: Arc::new(BenchmarkSuite::embedded().unwrap()),
        }
    }

    async fn get_status(uri: &str) -> StatusCode {
        router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn routes_are_mounted() {
        assert_eq!(get_status("/health").await, StatusCode::OK);
        assert_eq!(get_status("/api/benchmarks").await, StatusCode::OK);
        assert_eq!(get_status("/api/benchmarks/top/arc_challenge").await, StatusCode::OK);
        assert_eq!(
            get_status("/api/identity?id=TeichAI/Qwen3-8B-GPT-5-Codex-Distill").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn bad_metric_is_client_error() {
        assert_eq!(get_status("/api/benchmarks/top/bleu").await, StatusCode::BAD_REQUEST);
        assert_eq!(get_status("/api/benchmarks?metric=bleu").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_identity_param_is_rejected() {
        assert_eq!(get_status("/api/identity").await, StatusCode::BAD_REQUEST);
    }
}
