use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{CompressFailure, CompressedArtifact, PdfArtifact, RequestId, ToolMode, UploadedFileRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User switched tool panel.
    ModeSelected(ToolMode),
    /// User picked or dropped local files.
    FilesSelected(Vec<PathBuf>),
    /// Backend answered an upload.
    UploadFinished {
        request_id: RequestId,
        result: Result<Vec<UploadedFileRef>, String>,
    },
    /// User removed one preview.
    RemoveClicked(usize),
    /// User clicked Clear all.
    ClearAllClicked,
    /// User moved the quality slider.
    QualityChanged(u8),
    /// User edited the output name box.
    OutputNameChanged(String),
    /// User clicked Generate/Process PDF.
    ConvertClicked,
    /// User clicked Merge.
    MergeClicked,
    /// User asked to rotate pages of one uploaded PDF (page index to angle).
    RotateRequested {
        index: usize,
        rotations: BTreeMap<u32, i32>,
    },
    /// User asked to drop pages from one uploaded PDF.
    DeletePagesRequested { index: usize, pages: Vec<u32> },
    /// Backend answered a PDF producing request (convert, merge, rotate, delete pages).
    PdfReady {
        request_id: RequestId,
        result: Result<PdfArtifact, String>,
    },
    /// User clicked Compress all.
    BatchCompressClicked,
    /// Backend answered one compress request of the running batch.
    CompressFinished {
        request_id: RequestId,
        index: usize,
        result: Result<CompressedArtifact, CompressFailure>,
    },
    /// User asked to save one download (or all of them with `None`).
    SaveRequested(Option<usize>),
    /// A download was written to disk, or failed to.
    SaveFinished {
        request_id: RequestId,
        result: Result<PathBuf, String>,
    },
    /// Periodic usage counter refresh.
    CounterTick,
    /// Backend answered the usage counter.
    CounterLoaded(Result<u64, String>),
    /// User closed the success dialog or the alert.
    NoticeDismissed,
    /// UI/render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
