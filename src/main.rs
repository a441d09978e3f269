use actix_web::{App, HttpServer, middleware::Logger, web};
use agro_planner::{
    api::{self, AppState},
    config::{database, load_settings},
    errors::{Error, Result},
    gateway::{JohnDeereClient, VendorGateway},
    scheduler::SchedulerCoordinator,
};
use dotenvy::dotenv;
use std::{path::Path, sync::Arc};
use tracing::{error, info};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console logging always; a daily-rolling `app.log` when `log_dir` is set.
/// The returned guard must live as long as the process to flush the file.
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "app.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))?;
    Ok(guard)
}

#[actix_web::main]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 2. Load settings; LOG_DIR decides where tracing writes
    let settings = load_settings()?;

    // 3. Initialize tracing
    let _log_guard = init_tracing(settings.log_dir.as_deref())?;
    info!("Configuration loaded");

    // 4. Initialize database
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;

    // 5. Wire the vendor client into the scheduler
    let gateway: Arc<dyn VendorGateway> = Arc::new(JohnDeereClient::new(settings.vendor.clone())?);
    let scheduler = Arc::new(SchedulerCoordinator::new(
        db.clone(),
        settings.scheduler.interval_seconds,
    ));
    scheduler.configure(Arc::clone(&gateway)).await;
    if settings.scheduler.autostart && settings.scheduler.interval_seconds > 0 {
        scheduler.start().await?;
    } else {
        info!("Scheduler autostart disabled");
    }

    // 6. Serve HTTP
    let state = AppState {
        db,
        gateway,
        scheduler: Arc::clone(&scheduler),
        auth: settings.auth.clone(),
    };
    info!(bind_address = %settings.bind_address, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(api::configure)
    })
    .bind(settings.bind_address.as_str())?
    .run()
    .await?;

    scheduler.stop().await;
    info!("Server shut down");
    Ok(())
}
