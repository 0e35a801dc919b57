//! Status queries and waiting for a job to reach a terminal state.

use crate::client::{decode_json, ensure_success, VisionClient};
use crate::error::VisionError;
use crate::types::JobStatus;
use tokio::time::{sleep, Instant};

impl VisionClient {
    /// Retrieves the current status of a job with a single query.
    ///
    /// # Arguments
    ///
    /// * `request_id` - The identifier returned when the job was submitted.
    pub async fn get_status(&self, request_id: &str) -> Result<JobStatus, VisionError> {
        let url = self.models_url(&[request_id, "status"]);
        let response = self.client.get(url).send().await?;
        let operation = || format!("Status check for job {request_id}");
        let response = ensure_success(response, operation).await?;
        decode_json(response, operation).await
    }

    /// Waits for a job to finish by polling its status.
    ///
    /// The status is queried once per poll interval until it is `completed` or
    /// `error`. `on_progress` sees every snapshot, in order, including the final one,
    /// so the latest call always reflects the most recent state.
    ///
    /// A failed job is not an `Err`: the returned snapshot has status `error` and the
    /// server's message in [`JobStatus::error`].
    ///
    /// # Errors
    ///
    /// - `VisionError::RemoteRejected` / `VisionError::Transport` if any query fails.
    ///   Polling stops at the first failure.
    /// - `VisionError::Timeout` if a maximum wait is configured and the job is still
    ///   running when the next poll would fall outside it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use vision3d::VisionClient;
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// # let client = VisionClient::from_env()?;
    /// let final_status = client
    ///     .wait_for_completion("abc123", |s| println!("{}: {}%", s.status, s.progress))
    ///     .await?;
    /// println!("Job finished with status: {}", final_status.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_completion<F>(
        &self,
        request_id: &str,
        mut on_progress: F,
    ) -> Result<JobStatus, VisionError>
    where
        F: FnMut(&JobStatus),
    {
        let started = Instant::now();
        loop {
            let status = self.get_status(request_id).await?;
            tracing::debug!(
                request_id,
                status = %status.status,
                progress = status.progress,
                "polled job status"
            );
            on_progress(&status);

            if status.is_terminal() {
                tracing::info!(request_id, status = %status.status, "job reached terminal state");
                return Ok(status);
            }

            if let Some(max_wait) = self.max_wait {
                let waited = started.elapsed();
                if waited + self.poll_interval > max_wait {
                    return Err(VisionError::Timeout {
                        request_id: request_id.to_string(),
                        waited,
                    });
                }
            }

            sleep(self.poll_interval).await;
        }
    }
}
