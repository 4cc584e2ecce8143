use anyhow::Result;
use pandora::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
