use async_trait::async_trait;

use cosecha_types::{Error, Result};

/// Captured audio ready for upload. Capture itself happens in the platform
/// shell; this layer only sees bytes plus a mime type.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: &str) -> Self {
        Self { bytes, mime: mime.to_string() }
    }

    /// File extension derived from the mime type, `webm` when unknown.
    pub fn extension(&self) -> &str {
        self.mime.split('/').nth(1).filter(|s| !s.is_empty()).unwrap_or("webm")
    }
}

/// Seam over the blob-upload service.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the blob under `path`, returning the stored path.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Publicly reachable URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

const VOICE_BUCKET: &str = "voice-applications";

/// Storage-provider REST client. Objects land in the voice-applications
/// bucket and are served from its public URL space.
pub struct HttpBlobStore {
    http: reqwest::Client,
    base: String,
    anon_key: String,
    bucket: String,
}

impl HttpBlobStore {
    pub fn new(base: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            bucket: VOICE_BUCKET.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base, self.bucket, path);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, "3600")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    Error::unreachable()
                } else {
                    Error::Unexpected(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                status,
                message: format!("Failed to upload audio file: {message}"),
            });
        }
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base, self.bucket, path)
    }
}

/// Upload a voice note and return its public URL. The path layout keeps one
/// folder per user and stamps the file so repeated applications never clash.
pub async fn upload_voice_note(
    store: &dyn BlobStore,
    clip: &AudioClip,
    user_id: &str,
    job_id: i64,
) -> Result<String> {
    if clip.bytes.is_empty() {
        return Err(Error::Validation("Invalid audio clip provided.".to_string()));
    }
    let stamp = chrono::Utc::now().timestamp_millis();
    let path = format!("{user_id}/{job_id}-{stamp}.{}", clip.extension());
    let stored = store.upload(&path, clip.bytes.clone(), &clip.mime).await?;
    Ok(store.public_url(&stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_mime() {
        assert_eq!(AudioClip::new(vec![1], "audio/webm").extension(), "webm");
        assert_eq!(AudioClip::new(vec![1], "audio/ogg").extension(), "ogg");
        assert_eq!(AudioClip::new(vec![1], "garbage").extension(), "webm");
    }

    #[test]
    fn public_url_layout() {
        let store = HttpBlobStore::new("https://storage.example.com/", "key");
        assert_eq!(
            store.public_url("u1/7-123.webm"),
            "https://storage.example.com/storage/v1/object/public/voice-applications/u1/7-123.webm"
        );
    }

    #[tokio::test]
    async fn empty_clip_is_rejected_before_upload() {
        struct NeverStore;
        #[async_trait]
        impl BlobStore for NeverStore {
            async fn upload(&self, _: &str, _: Vec<u8>, _: &str) -> Result<String> {
                panic!("upload must not be reached");
            }
            fn public_url(&self, path: &str) -> String {
                path.to_string()
            }
        }

        let clip = AudioClip::new(Vec::new(), "audio/webm");
        let err = upload_voice_note(&NeverStore, &clip, "u1", 7).await.unwrap_err();
        assert!(err.is_validation());
    }
}
