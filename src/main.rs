use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cogito::banner::print_banner;
use cogito::config::Settings;
use cogito::consts::{
    ANTHROPIC_URL, DEFAULT_BIND, DEFAULT_MAX_MODEL_STEPS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STEP_DELAY_MS, OPENAI_URL,
};
use cogito::provider::http::HttpGateway;
use cogito::server::{self, AppState};

#[derive(Parser)]
#[command(
    name = "cogito",
    version,
    about = "Stream a staged chain-of-thought from your LLM provider."
)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "COGITO_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Pause between streamed reasoning steps, in milliseconds
    #[arg(long, env = "COGITO_STEP_DELAY_MS", default_value_t = DEFAULT_STEP_DELAY_MS)]
    step_delay_ms: u64,

    /// Maximum reasoning steps taken from the model's reply
    #[arg(long, env = "COGITO_MAX_MODEL_STEPS", default_value_t = DEFAULT_MAX_MODEL_STEPS)]
    max_model_steps: usize,

    /// Provider request timeout in seconds
    #[arg(short, long, env = "COGITO_REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// OpenAI chat completions endpoint
    #[arg(long, env = "COGITO_OPENAI_URL", default_value = OPENAI_URL)]
    openai_url: String,

    /// Anthropic messages endpoint
    #[arg(long, env = "COGITO_ANTHROPIC_URL", default_value = ANTHROPIC_URL)]
    anthropic_url: String,

    /// Open the UI in the default browser once listening
    #[arg(long, default_value_t = false)]
    open: bool,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Settings {
            bind: cli.bind,
            step_delay: Duration::from_millis(cli.step_delay_ms),
            max_model_steps: cli.max_model_steps,
            request_timeout: Duration::from_secs(cli.request_timeout),
            openai_url: cli.openai_url,
            anthropic_url: cli.anthropic_url,
            open_browser: cli.open,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cogito=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from(Cli::parse());

    let gateway = Arc::new(HttpGateway::new(
        settings.endpoints(),
        settings.request_timeout,
    )?);
    let state = AppState::new(gateway, settings.reasoning());

    print_banner(&settings);
    server::serve(&settings, state).await
}
