use std::error::Error;

use changeset_comment::ci::CiContext;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from a .env file for local runs.
    // CI provides the real variables, so a missing file is not an error.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let ctx = CiContext::from_env()?;
    changeset_comment::run(&ctx).await?;

    Ok(())
}
