use tracing::warn;

use cosecha_client::{AudioClip, ContractCache, ResourceClient, Submission, apply_to_job};
use cosecha_client::storage::BlobStore;
use cosecha_types::api::JobFilter;
use cosecha_types::models::Job;

use crate::view::View;

/// Shown when the backend cannot be reached, so the listing is never blank.
pub fn sample_jobs() -> Vec<Job> {
    vec![
        Job {
            id: 1,
            title: "Tomato Picker".to_string(),
            pay: "$12/hr".to_string(),
            location: "Farm A".to_string(),
            date: "Nov 20, 2025".to_string(),
            description: None,
            crop_type: None,
            workers_requested: None,
        },
        Job {
            id: 2,
            title: "Berry Harvester".to_string(),
            pay: "$10/hr".to_string(),
            location: "Farm B".to_string(),
            date: "Nov 21, 2025".to_string(),
            description: None,
            crop_type: None,
            workers_requested: None,
        },
    ]
}

/// Jobs listing. Load failures degrade to the sample list plus a banner
/// rather than an empty or broken page.
pub async fn load(client: &ResourceClient, filter: &JobFilter) -> View {
    match client.list_jobs(filter).await {
        Ok(jobs) => View::Jobs { jobs, banner: None },
        Err(err) => {
            warn!("could not load jobs: {err}");
            View::Jobs {
                jobs: sample_jobs(),
                banner: Some(
                    "Could not load jobs. Please verify the server is running.".to_string(),
                ),
            }
        }
    }
}

/// Apply to a job, optionally with a voice note. Returns the confirmation
/// or error message to show the applicant.
pub async fn apply(
    client: &ResourceClient,
    blobs: &dyn BlobStore,
    cache: Option<&ContractCache>,
    job_id: i64,
    worker_id: Option<&str>,
    clip: Option<&AudioClip>,
    proceed_without_audio: impl FnOnce(&cosecha_types::Error) -> bool,
) -> String {
    match apply_to_job(client, blobs, cache, job_id, worker_id, clip, proceed_without_audio).await {
        Ok(Submission::Submitted(_)) => {
            "Application submitted! The employer will review your application.".to_string()
        }
        Ok(Submission::Aborted) => "Application cancelled.".to_string(),
        Err(err) if err.is_network() => err.to_string(),
        Err(err) => format!("Error submitting application: {err}"),
    }
}
