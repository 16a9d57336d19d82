use std::sync::Arc;

use anyhow::{Context, Result};
use common::database::{self, DatabaseConfig, init_pool};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use registry::{
    MIGRATOR,
    config::Settings,
    images::S3ImageStore,
    mailer::mailer_from_settings,
    notifications::{EmailTemplates, MailQueue},
    repositories::{EventRepository, GiftRepository, RsvpRepository, UserRepository},
    routes,
    services::{AuthService, EventService, GiftService, RsvpService},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting gift registry service");

    let settings = Settings::load().context("Failed to load settings")?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &MIGRATOR).await?;

    let users = Arc::new(UserRepository::new(pool.clone()));
    let events = Arc::new(EventRepository::new(pool.clone()));
    let gifts = Arc::new(GiftRepository::new(pool.clone()));
    let rsvps = Arc::new(RsvpRepository::new(pool));

    let images = Arc::new(S3ImageStore::from_settings(&settings.images).await);

    let mailer = mailer_from_settings(&settings.mail)?;
    let templates = EmailTemplates::new(settings.server.app_base_url.clone());
    let (mail_queue, _mail_worker) = MailQueue::start(mailer, templates);

    let app_state = AppState {
        auth: AuthService::new(users.clone()),
        events: EventService::new(
            events.clone(),
            users.clone(),
            gifts.clone(),
            rsvps.clone(),
            images.clone(),
            Arc::new(mail_queue),
        ),
        gifts: GiftService::new(gifts, events, users, images),
        rsvps: RsvpService::new(rsvps),
    };

    // Start the web server
    let cors = routes::cors_layer(&settings.server.frontend_origin)
        .context("Invalid frontend origin")?;
    let app = routes::create_router(app_state, cors);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Gift registry listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
