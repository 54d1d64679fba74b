use clap::Parser;

use cliplink_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cliplink_lib::bootstrap::run(cli).await
}
