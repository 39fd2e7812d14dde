use clap::Parser;
use manus_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    manus_cli::init_tracing(cli.debug);

    if !manus_cli::run(cli).await? {
        std::process::exit(1);
    }
    Ok(())
}
