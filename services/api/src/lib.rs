mod cli;
mod infra;
mod report;
mod routes;
mod server;

use arc_directory::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
