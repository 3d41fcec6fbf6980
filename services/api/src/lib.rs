mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use nutriscan::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
