pub mod cache;
pub mod http;
pub mod storage;
pub mod submit;

pub use cache::ContractCache;
pub use http::ResourceClient;
pub use storage::{AudioClip, BlobStore, HttpBlobStore};
pub use submit::{Submission, apply_to_job};
