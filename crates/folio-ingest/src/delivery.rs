//! Delivery resilience policy for outward transport calls.
//!
//! Two transient failure kinds are recognized. A rate limit carries the wait
//! the transport demands: suspend once for that duration, then retry the same
//! send exactly once. A network failure, or a second failure after the
//! retry, abandons the send. Abandonment is surfaced as `Ok(None)` so the
//! caller can skip the catalog mutation that would otherwise follow —
//! callers always send first and mutate second, so an abandoned send leaves
//! the catalog untouched.

use std::future::Future;

use tracing::warn;

use folio_core::{Error, Result};

/// Run an outward send under the bounded backoff-and-retry policy.
///
/// Returns `Ok(Some(value))` on success, `Ok(None)` when the send was
/// abandoned (rate-limit retry exhausted or transient network failure).
/// Non-transient errors propagate unchanged.
pub async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Ok(value) => Ok(Some(value)),
        Err(Error::RateLimited(wait)) => {
            warn!(
                op = op_name,
                retry_after_secs = wait.as_secs_f64(),
                "delivery: rate limited, backing off once"
            );
            tokio::time::sleep(wait).await;
            match op().await {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.is_transient() => {
                    warn!(op = op_name, error = %e, "delivery: retry failed, abandoning send");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
        Err(Error::Network(e)) => {
            warn!(op = op_name, error = %e, "delivery: network failure, abandoning send");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
