//! edu-cli - Command line tool for the Romanian education map.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "edu-cli",
    version,
    about = "Romanian education statistics toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: edu_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    edu_cmd::run(cli.command).await
}
