use std::sync::Arc;

use axum::{middleware::from_fn, Router};
use rockdrop::core::config::Config;
use rockdrop::core::middleware;
use rockdrop::core::openapi::{ApiDoc, SwaggerInfoModifier};
use rockdrop::features::rate_limits::{routes as rate_limits_routes, RateLimiter};
use rockdrop::features::uploads::clients::{CaptchaVerifier, TurnstileClient};
use rockdrop::features::uploads::{routes as uploads_routes, UploadState};
use rockdrop::modules::storage::{ObjectStore, S3Client};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Missing settings do not stop the server; uploads are refused until they are set
    let missing = config.missing_settings();
    if !missing.is_empty() {
        tracing::error!(
            "Uploads disabled, missing settings: {}",
            missing.join(", ")
        );
    }
    if config.turnstile.site_key.is_none() {
        tracing::warn!("TURNSTILE_SITE_KEY is not set; clients cannot render the widget");
    }

    // Initialize object storage client
    let store: Option<Arc<dyn ObjectStore>> = match config.storage.settings() {
        Some(settings) => match S3Client::new(&settings) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!("Storage client not available: {}", e);
                None
            }
        },
        None => None,
    };

    // Initialize Turnstile verifier
    let verifier: Option<Arc<dyn CaptchaVerifier>> = match config.turnstile.secret_key.clone() {
        Some(secret_key) => match TurnstileClient::new(
            secret_key,
            config.turnstile.verify_url.clone(),
            config.turnstile.timeout,
        ) {
            Ok(client) => {
                tracing::info!(
                    "Turnstile verifier initialized ({})",
                    config.turnstile.verify_url
                );
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Turnstile verifier not available: {}", e);
                None
            }
        },
        None => None,
    };

    // Rate limiter with background sweep
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window,
    ));
    rate_limiter.spawn_sweeper(config.rate_limit.sweep_interval);
    tracing::info!(
        "Rate limiter initialized ({} uploads per {}s, sweep every {}s)",
        config.rate_limit.max_requests,
        config.rate_limit.window.as_secs(),
        config.rate_limit.sweep_interval.as_secs()
    );

    tokio::fs::create_dir_all(&config.upload.temp_dir).await?;
    let upload_state = UploadState::new(&config, store, verifier, Arc::clone(&rate_limiter));

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(uploads_routes(upload_state))
        .merge(rate_limits_routes(rate_limiter))
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
