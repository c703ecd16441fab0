use std::sync::Arc;
use telegram_relay::AppResources;
use telegram_relay::api::start_webserver;
use telegram_relay::clock::LocalClock;
use telegram_relay::config::load_config_or_panic;
use telegram_relay::store::LogStore;
use telegram_relay::telegram::TelegramClient;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "telegram_relay=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    initialize_standard_tracing();

    // Read the local offset while the process is still single-threaded.
    let clock = LocalClock::detect();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(clock))
}

async fn run(clock: LocalClock) -> color_eyre::eyre::Result<()> {
    let config = Arc::new(load_config_or_panic());

    let store = LogStore::connect(&config.database_url).await?;
    store.init().await?;
    tracing::info!(database_url = %config.database_url, "Database initialized");

    let telegram = Arc::new(TelegramClient::new(&config.telegram, &config.bot_token)?);
    tracing::info!(
        bot_token_set = !config.bot_token.is_empty(),
        default_chat_set = !config.chat_id.is_empty(),
        timeout_secs = config.telegram.timeout_secs,
        history_default_limit = config.history.default_limit,
        utc_offset = ?clock.offset(),
        "relay configuration"
    );

    let resources = AppResources {
        store,
        telegram,
        config,
        clock,
    };

    start_webserver(resources).await?;
    Ok(())
}
