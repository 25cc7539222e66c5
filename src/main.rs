use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use workforce::config::Config;
use workforce::db::init_db;
use workforce::docs::ApiDoc;
use workforce::routes;
use workforce::services::Services;
use workforce::utils::{email_cache, email_filter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = match init_db(&config.database_url, config.db_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = ?e, "Database initialisation failed");
            return Err(e);
        }
    };

    let services = Services::from_pool(pool.clone(), &config);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if let Err(e) = services.users.ensure_admin(email, password).await {
            warn!(error = %e, "Could not create the initial admin");
        }
    }

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool;

    actix_web::rt::spawn(async move {
        if let Err(e) = email_filter::warmup_email_filter(&pool_for_filter_warmup, 100).await {
            error!(error = ?e, "Failed to warm up email filter");
        }
    });

    actix_web::rt::spawn(async move {
        // recent logins only; the filter covers everyone
        if let Err(e) = email_cache::warmup_email_cache(&pool_for_cache_warmup, 30, 250).await {
            error!(error = ?e, "Failed to warm up email cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        let config = config_data.clone();
        let services = services.clone();

        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config.clone())
            .configure(|cfg| services.register(cfg))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
