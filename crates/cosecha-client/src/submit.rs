use tracing::{debug, warn};

use cosecha_types::Result;
use cosecha_types::api::CreateContractRequest;
use cosecha_types::models::Contract;

use crate::cache::ContractCache;
use crate::http::ResourceClient;
use crate::storage::{AudioClip, BlobStore, upload_voice_note};

/// Outcome of an application attempt. `Aborted` means the applicant chose
/// not to continue after the audio upload failed; nothing was written.
#[derive(Debug)]
pub enum Submission {
    Submitted(Contract),
    Aborted,
}

/// Turn a "worker applies to a job" gesture into a durable application.
///
/// Policy: an audio upload failure is surfaced through `proceed_without_audio`
/// and only a confirmed "yes" continues without the recording. The backend
/// POST is the sole mutation; the cache append afterwards is best-effort.
/// There is no automatic retry and no partial record on failure.
pub async fn apply_to_job(
    client: &ResourceClient,
    blobs: &dyn BlobStore,
    cache: Option<&ContractCache>,
    job_id: i64,
    worker_id: Option<&str>,
    clip: Option<&AudioClip>,
    proceed_without_audio: impl FnOnce(&cosecha_types::Error) -> bool,
) -> Result<Submission> {
    let audio_url = match clip {
        Some(clip) => {
            let folder = worker_id.unwrap_or("anonymous");
            match upload_voice_note(blobs, clip, folder, job_id).await {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!("audio upload failed: {err}");
                    if !proceed_without_audio(&err) {
                        return Ok(Submission::Aborted);
                    }
                    None
                }
            }
        }
        None => None,
    };

    let request = CreateContractRequest {
        job_id,
        worker_id: worker_id.map(str::to_string),
        audio_url,
    };
    let contract = client.create_contract(&request).await?;

    if let Some(cache) = cache {
        if let Err(err) = cache.append(&contract) {
            debug!("could not cache new contract: {err}");
        }
    }
    Ok(Submission::Submitted(contract))
}
