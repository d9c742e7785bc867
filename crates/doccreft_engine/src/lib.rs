//! DocCreft engine: typed backend client and effect execution.
mod client;
mod engine;
mod filename;
mod persist;
mod types;

pub use client::{ClientSettings, DocApi, ReqwestDocApi, DEFAULT_API_BASE};
pub use engine::EngineHandle;
pub use filename::sanitize_filename;
pub use persist::{ensure_download_dir, DownloadStore, PersistError};
pub use types::{
    ApiError, CompressOutput, EngineEvent, FailureKind, PdfOutput, RequestId, UploadedFile,
};
