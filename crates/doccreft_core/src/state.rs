use std::collections::BTreeMap;

use crate::view_model::{merge_controls, AppViewModel, BatchProgress, PreviewItem, PreviewKind};

pub type RequestId = u64;

pub const DEFAULT_QUALITY: u8 = 60;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_EXPORT_NAME: &str = "DocCreft_Export";
pub const DEFAULT_COMPRESSED_NAME: &str = "DocCreft_Compressed";

/// Which tool panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Images to PDF, PDF merge and page editing.
    #[default]
    Convert,
    /// Batch JPEG compression.
    Compress,
}

/// A file already accepted and stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFileRef {
    /// Filename as selected on the client device.
    pub original_name: String,
    /// Backend-assigned storage identifier, opaque to the client.
    pub server_name: String,
}

impl UploadedFileRef {
    pub fn new(original_name: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            server_name: server_name.into(),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.original_name.to_lowercase().ends_with(".pdf")
    }

    /// Original name without its extension, used to name edited copies.
    pub fn stem(&self) -> &str {
        match self.original_name.rfind('.') {
            Some(idx) if idx > 0 => &self.original_name[..idx],
            _ => &self.original_name,
        }
    }
}

/// One entry of the download list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    /// Name the artifact is offered under.
    pub name: String,
    /// Name to request from the download endpoint.
    pub server_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success,
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    pub pdf_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    pub url: String,
    pub filename: String,
}

/// Why a single compress request produced no artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressFailure {
    /// The backend answered but refused the file. The batch moves on.
    Rejected(String),
    /// No usable answer at all. The batch stops.
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchCompress {
    pub(crate) base: String,
    pub(crate) quality: u8,
    pub(crate) files: Vec<String>,
    /// Index of the file whose request is in flight.
    pub(crate) current: usize,
    pub(crate) request_id: RequestId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    mode: ToolMode,
    files: Vec<UploadedFileRef>,
    quality: u8,
    output_name: String,
    downloads: Vec<DownloadItem>,
    primary_download: Option<DownloadItem>,
    usage_count: Option<u64>,
    pending: usize,
    notice: Option<Notice>,
    batch: Option<BatchCompress>,
    /// Download names awaited for in-flight PDF producing requests.
    pdf_requests: BTreeMap<RequestId, String>,
    next_request_id: RequestId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: ToolMode::default(),
            files: Vec::new(),
            quality: DEFAULT_QUALITY,
            output_name: String::new(),
            downloads: Vec::new(),
            primary_download: None,
            usage_count: None,
            pending: 0,
            notice: None,
            batch: None,
            pdf_requests: BTreeMap::new(),
            next_request_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let (merge_visible, process_label) = merge_controls(self.mode, &self.files);
        AppViewModel {
            mode: self.mode,
            workspace_visible: !self.files.is_empty(),
            previews: self
                .files
                .iter()
                .enumerate()
                .map(|(index, file)| PreviewItem {
                    index,
                    original_name: file.original_name.clone(),
                    server_name: file.server_name.clone(),
                    kind: if file.is_pdf() {
                        PreviewKind::PdfIcon
                    } else {
                        PreviewKind::Thumbnail
                    },
                })
                .collect(),
            convert_panel_visible: self.mode == ToolMode::Convert,
            compress_panel_visible: self.mode == ToolMode::Compress,
            merge_visible,
            process_label,
            quality: self.quality,
            output_name: self.output_name.clone(),
            downloads: self.downloads.clone(),
            primary_download: self.primary_download.clone(),
            usage_count: self.usage_count,
            loading: self.pending > 0,
            notice: self.notice.clone(),
            batch_progress: self.batch.as_ref().map(|batch| BatchProgress {
                done: batch.current,
                total: batch.files.len(),
            }),
            dirty: self.dirty,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn files(&self) -> &[UploadedFileRef] {
        &self.files
    }

    pub fn downloads(&self) -> &[DownloadItem] {
        &self.downloads
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns whether a redraw is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub(crate) fn set_mode(&mut self, mode: ToolMode) {
        self.files.clear();
        self.mode = mode;
        self.mark_dirty();
    }

    pub(crate) fn append_files(&mut self, files: Vec<UploadedFileRef>) {
        if files.is_empty() {
            return;
        }
        self.files.extend(files);
        self.mark_dirty();
    }

    pub(crate) fn remove_file(&mut self, index: usize) -> bool {
        if index >= self.files.len() {
            return false;
        }
        self.files.remove(index);
        self.mark_dirty();
        true
    }

    pub(crate) fn clear_files(&mut self) {
        self.files.clear();
        self.mark_dirty();
    }

    pub(crate) fn file(&self, index: usize) -> Option<&UploadedFileRef> {
        self.files.get(index)
    }

    pub(crate) fn server_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.server_name.clone()).collect()
    }

    pub(crate) fn quality(&self) -> u8 {
        self.quality
    }

    pub(crate) fn set_quality(&mut self, quality: u8) {
        let clamped = quality.clamp(MIN_QUALITY, MAX_QUALITY);
        if clamped != self.quality {
            self.quality = clamped;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_output_name(&mut self, name: &str) {
        let trimmed = name.trim();
        if trimmed != self.output_name {
            self.output_name = trimmed.to_string();
            self.mark_dirty();
        }
    }

    /// Output base name, falling back to `default` when the user left it empty.
    pub(crate) fn output_base(&self, default: &str) -> String {
        if self.output_name.is_empty() {
            default.to_string()
        } else {
            self.output_name.clone()
        }
    }

    pub(crate) fn begin_operation(&mut self) {
        self.pending += 1;
        self.mark_dirty();
    }

    pub(crate) fn end_operation(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_usage_count(&mut self, count: u64) {
        if self.usage_count != Some(count) {
            self.usage_count = Some(count);
            self.mark_dirty();
        }
    }

    pub(crate) fn track_pdf_request(&mut self, request_id: RequestId, download_name: String) {
        self.pdf_requests.insert(request_id, download_name);
    }

    pub(crate) fn take_pdf_request(&mut self, request_id: RequestId) -> Option<String> {
        self.pdf_requests.remove(&request_id)
    }

    /// Replaces the download list with the single produced PDF.
    pub(crate) fn publish_pdf(&mut self, item: DownloadItem) {
        self.downloads = vec![item.clone()];
        self.primary_download = Some(item);
        self.mark_dirty();
    }

    pub(crate) fn reset_downloads_for_batch(&mut self) {
        self.downloads.clear();
        self.primary_download = None;
        self.mark_dirty();
    }

    pub(crate) fn push_download(&mut self, item: DownloadItem) {
        self.downloads.push(item);
        self.mark_dirty();
    }

    pub(crate) fn download(&self, index: usize) -> Option<&DownloadItem> {
        self.downloads.get(index)
    }

    pub(crate) fn batch(&self) -> Option<&BatchCompress> {
        self.batch.as_ref()
    }

    pub(crate) fn batch_mut(&mut self) -> Option<&mut BatchCompress> {
        self.batch.as_mut()
    }

    pub(crate) fn start_batch(&mut self, batch: BatchCompress) {
        self.batch = Some(batch);
        self.mark_dirty();
    }

    pub(crate) fn finish_batch(&mut self) -> Option<BatchCompress> {
        let finished = self.batch.take();
        if finished.is_some() {
            self.mark_dirty();
        }
        finished
    }
}
