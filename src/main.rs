use anyhow::Result;

use webhook_receiver::{startup, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    startup::init_tracing(config.log_format);

    startup::run(config).await
}
