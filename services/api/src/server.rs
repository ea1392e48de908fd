use crate::cli::ServeArgs;
use crate::infra::{seed_demo_tenants, AppState};
use crate::routes::with_cv_routes;
use affittochiaro::config::{AppConfig, CvStoreBackend};
use affittochiaro::cv::{
    CvGuardPolicy, CvRepository, CvService, InMemoryCvRepository, JsonFileCvRepository,
};
use affittochiaro::error::AppError;
use affittochiaro::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.cv.store.clone() {
        CvStoreBackend::Memory => {
            info!("using in-memory cv store");
            serve_with(&config, Arc::new(InMemoryCvRepository::default())).await
        }
        CvStoreBackend::File { dir } => {
            info!(dir = %dir.display(), "using json file cv store");
            serve_with(&config, Arc::new(JsonFileCvRepository::open(dir)?)).await
        }
    }
}

async fn serve_with<R>(config: &AppConfig, repository: Arc<R>) -> Result<(), AppError>
where
    R: CvRepository + 'static,
{
    if config.cv.seed_demo_data {
        seed_demo_tenants(repository.as_ref())?;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let policy = CvGuardPolicy::new(config.cv.max_document_bytes);
    let cv_service = Arc::new(CvService::new(repository, policy));

    let app = with_cv_routes(cv_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tenant cv service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
