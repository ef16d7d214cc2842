//! API health probe.

use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;

use crate::context::Console;
use crate::output;

pub async fn execute(console: &Console) -> AppResult<()> {
    let base_url = console.client.base_url().to_string();
    if console.client.health_check().await {
        output::print_success(&format!("{base_url} is healthy"));
        Ok(())
    } else {
        Err(AppError::service_unavailable(format!("{base_url} did not answer /health")))
    }
}
