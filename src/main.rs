use std::sync::Arc;

use finder_bot::bot::Bot;
use finder_bot::config::BotConfig;
use finder_bot::messenger::GraphClient;
use finder_bot::search::HttpPeopleSearch;
use finder_bot::webhook::{webhook_routes, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  set BOT_CONFIG to a config file or provide config/default.json");
            std::process::exit(1);
        }
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| config.port());

    eprintln!("🔎 Finder Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{port}/webhook");
    eprintln!("   Health: http://0.0.0.0:{port}/health");
    eprintln!("   Questions: {}", config.dialog.questions.len());
    eprintln!("   Dialog lifetime: {}s", config.dialog_lifetime);
    eprintln!("   Search: {}\n", config.search_url);

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let send_api = Arc::new(GraphClient::new(
        client.clone(),
        config.facebook_graph_url.clone(),
        config.page_access_token.clone(),
    ));
    let search = Arc::new(HttpPeopleSearch::new(client, config.search_url.clone()));

    let bot = Arc::new(Bot::new(&config, send_api, search));
    let state = AppState {
        bot,
        validation_token: config.validation_token.clone(),
        app_secret: config.app_secret.clone(),
    };

    let app = webhook_routes(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port = port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
