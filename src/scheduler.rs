use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{info, warn};

use crate::hub::HubClient;

/// Re-fetch every hub listing on `cron` so requests hit a warm cache.
pub async fn start_scheduler(hub: HubClient, cron: &str) -> Result<JobScheduler, JobSchedulerError> {
    let sched = JobScheduler::new().await?;

    sched
        .add(Job::new_async(cron, move |_uuid, _l| {
            let hub = hub.clone();
            Box::pin(async move {
                info!("Refreshing hub listings");
                match hub.refresh().await {
                    Ok(data) => info!(
                        "Hub listings refreshed: {} models, {} datasets",
                        data.models.len(),
                        data.datasets.len()
                    ),
                    Err(e) => warn!("Hub refresh failed: {}", e),
                }
            })
        })?)
        .await?;

    sched.start().await?;
    Ok(sched)
}
