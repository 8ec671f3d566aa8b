use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs `operation` until it succeeds or `retries` extra attempts are spent,
/// sleeping `delay` between attempts. `what` names the operation in logs.
pub async fn with_retry<F, Fut, T, E>(
    what: &str,
    mut operation: F,
    retries: usize,
    delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(Into::into) {
            Ok(val) => return Ok(val),
            Err(err) if attempt > retries => return Err(err),
            Err(err) => {
                debug!(what, attempt, retries, error = %err, "Attempt failed, retrying");
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
