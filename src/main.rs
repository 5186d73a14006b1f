use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bustime_aggregator::{
    AppState, BusTimeApi, BusTimeClient, Config, Result, RouteDataService, create_router,
    start_refresh_loop,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    // Инициализация логирования
    setup_tracing();

    let config = Config::from_env();

    let client = BusTimeClient::new(&config)?;

    // Загружаем полный список маршрутов один раз при старте
    let routes = client.fetch_all_routes().await.map_err(|e| {
        tracing::error!("Failed to load the route table: {}", e);
        e
    })?;
    tracing::info!("Loaded {} known routes from the BusTime API", routes.len());

    let service = Arc::new(RouteDataService::new(
        client,
        routes,
        Duration::from_secs(config.recency_window_secs),
    ));

    // Создаём состояние приложения
    let state = Arc::new(AppState {
        config: config.clone(),
        service: service.clone(),
    });

    // Канал завершения (graceful shutdown)
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ожидание Ctrl+C
    tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    // Запускаем фоновое обновление real-time данных
    start_refresh_loop(
        service.clone(),
        Duration::from_secs(config.refresh_interval_secs),
        shutdown_rx.clone(),
    );

    // Прогреваем кэши для предзагружаемых маршрутов
    if !config.preload_routes.is_empty() {
        let preload = config.preload_routes.clone();
        let warm_service = service.clone();
        tokio::spawn(async move {
            for route_id in preload {
                match warm_service.get_route_data(&route_id).await {
                    Ok(_) => tracing::info!("Preloaded route {}", route_id),
                    Err(e) => tracing::warn!("Failed to preload route {}: {}", route_id, e),
                }
            }
        });
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server_addr.parse().map_err(|e| {
        tracing::error!("Invalid server address: {}", e);
        e
    })?;

    // Настройка адреса для прослушивания
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind address: {}", e);
        e
    })?;

    tracing::info!("BusTime aggregator starting on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - GET /health           - Health check");
    tracing::info!("  - GET /api/routes       - Known route list");
    tracing::info!("  - GET /api/routes/{{id}} - Merged route data");

    // Запуск сервера с graceful shutdown
    let mut server_shutdown = shutdown_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.changed().await;
            tracing::info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    Ok(())
}

fn setup_tracing() {
    // Используем EnvFilter::from_default_env() для правильной обработки RUST_LOG
    // Если RUST_LOG не установлена, используем "info" по умолчанию
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
