//! wx-gateway: Weather Forecast Chat Gateway Main Binary
//!
//! Usage:
//!   wx-gateway           - Start the gateway (login server + Telegram bot)
//!   wx-gateway --help    - Show help
//!   wx-gateway --version - Show version

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use wx_bot::{BotConfig, BotController, BrowserForecastProvider, CredentialProbe};
use wx_browser::{BrowserConfig, ForecastScraper};
use wx_core::{Config, CredentialStatus, CredentialStore};
use wx_login::{AccountClient, LoginServer};
use wx_telegram::TelegramBot;

/// Run mode
enum RunMode {
    /// Gateway mode (login server + Telegram bot)
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Bridges the controller's probe seam to the account client and store
struct AccountProbe {
    client: Arc<AccountClient>,
    store: CredentialStore,
}

#[async_trait]
impl CredentialProbe for AccountProbe {
    async fn check(&self) -> CredentialStatus {
        self.client.check(&self.store).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("wx-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting wx-gateway...");

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("wx-gateway - Weather Forecast Chat Gateway");
    println!();
    println!("Usage:");
    println!("  wx-gateway           Start the gateway (login server + Telegram bot)");
    println!("  wx-gateway --help    Show this help message");
    println!("  wx-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  TELEGRAM_BOT_TOKEN          Telegram bot token (required for the bot)");
    println!("  LOGIN_HOST                  Login form bind host (default: 127.0.0.1)");
    println!("  LOGIN_PORT                  Login form port (default: 8080)");
    println!("  LOGIN_PUBLIC_URL            Public URL of the login form");
    println!("  ACCOUNT_BASE_URL            windy.com account API base URL");
    println!("  CHROME_PATH                 Chrome/Chromium executable path");
    println!("  BROWSER_HEADLESS            Run the browser headless (default: true)");
    println!("  BROWSER_NAVIGATION_TIMEOUT  Navigation timeout in seconds (default: 30)");
    println!("  BROWSER_RENDER_TIMEOUT      Forecast render timeout in seconds (default: 15)");
}

/// Run the gateway: login form server plus the Telegram bot
async fn run_server(config: Config) -> anyhow::Result<()> {
    let store = CredentialStore::new();
    let account = Arc::new(
        AccountClient::with_base_url(&config.account.base_url)
            .map_err(|e| anyhow::anyhow!("Failed to create account client: {}", e))?,
    );

    // Track running services for shutdown
    let mut service_handles = Vec::new();

    // Start the login form server
    let login_server = LoginServer::new(config.login.clone(), Arc::clone(&account), store.clone());
    let handle = tokio::spawn(async move {
        if let Err(e) = login_server.run().await {
            tracing::error!("Login server error: {}", e);
        }
    });
    service_handles.push(handle);
    tracing::info!("Login server started on {}", config.login.login_url());

    // Start the Telegram bot if a token is configured
    if let Some(token) = &config.telegram.token {
        let bot = TelegramBot::new(token);

        let self_id = bot
            .self_id()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to identify bot account: {}", e))?;

        let scraper = ForecastScraper::new(BrowserConfig::from(&config.browser));
        let provider = Arc::new(BrowserForecastProvider::new(scraper));
        let probe = Arc::new(AccountProbe {
            client: Arc::clone(&account),
            store: store.clone(),
        });

        let mut bot_config = BotConfig::new(self_id, config.login.login_url());
        bot_config.image_width = config.browser.crop.width;
        bot_config.image_height = config.browser.crop.height;

        let controller = Arc::new(BotController::new(
            bot_config,
            Arc::new(bot.responder()),
            provider,
            probe,
            store.clone(),
        ));

        let handle = tokio::spawn(async move {
            if let Err(e) = bot.start(controller).await {
                tracing::error!("Telegram bot error: {}", e);
            }
        });
        service_handles.push(handle);
        tracing::info!("Telegram bot started");
    } else {
        tracing::info!("Telegram bot disabled (no token configured)");
    }

    tracing::info!("wx-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    for handle in service_handles {
        handle.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
