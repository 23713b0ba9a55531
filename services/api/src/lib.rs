mod assess;
mod cli;
mod infra;
mod routes;
mod server;

use mepca::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
