use crate::inbox::{run_inbox, InboxArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use crsel_site::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "crsel-site",
    about = "Serve the contact and career submission API, or inspect stored submissions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print stored contact messages and career applications, newest first
    Inbox(InboxArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding the record collections
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the directory holding uploaded CV files
    #[arg(long)]
    pub(crate) upload_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Inbox(args) => run_inbox(args).await,
    }
}
