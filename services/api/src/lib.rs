mod cli;
mod inbox;
mod infra;
mod routes;
mod server;

use crsel_site::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
