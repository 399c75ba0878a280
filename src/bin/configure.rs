use anyhow::Context;
use finder_bot::config::BotConfig;
use finder_bot::setup::SetupClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::load().context("loading configuration")?;

    eprintln!("⚙️  Configuring Messenger profile");
    eprintln!("   Graph API: {}", config.facebook_graph_url);

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("building HTTP client")?;

    let setup = SetupClient::new(
        client,
        config.facebook_graph_url.clone(),
        config.page_access_token.clone(),
    );

    let failed = setup.apply(&config).await;
    if failed > 0 {
        anyhow::bail!("{failed} setup call(s) failed");
    }

    eprintln!("   Done.");
    Ok(())
}
