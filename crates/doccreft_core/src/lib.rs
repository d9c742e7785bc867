//! DocCreft core: pure UI state machine and view-model helpers.
//!
//! Nothing in this crate performs IO. Front-ends feed [`Msg`] values into
//! [`update`], execute the returned [`Effect`]s, and draw [`AppViewModel`]s.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, CompressFailure, CompressedArtifact, DownloadItem, Notice, PdfArtifact, RequestId,
    ToolMode, UploadedFileRef, DEFAULT_COMPRESSED_NAME, DEFAULT_EXPORT_NAME, DEFAULT_QUALITY,
    MAX_QUALITY, MIN_QUALITY,
};
pub use update::update;
pub use view_model::{
    merge_controls, AppViewModel, BatchProgress, PreviewItem, PreviewKind, ProcessLabel,
};
