use crate::{DownloadItem, Notice, ToolMode, UploadedFileRef};

/// Label of the main convert button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessLabel {
    #[default]
    GeneratePdf,
    ProcessPdf,
}

impl ProcessLabel {
    pub fn text(self) -> &'static str {
        match self {
            ProcessLabel::GeneratePdf => "Generate PDF",
            ProcessLabel::ProcessPdf => "Process PDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// PDFs get a placeholder icon.
    PdfIcon,
    /// Images are previewed from the download endpoint by server name.
    Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub index: usize,
    pub original_name: String,
    pub server_name: String,
    pub kind: PreviewKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub mode: ToolMode,
    pub workspace_visible: bool,
    pub previews: Vec<PreviewItem>,
    pub convert_panel_visible: bool,
    pub compress_panel_visible: bool,
    pub merge_visible: bool,
    pub process_label: ProcessLabel,
    pub quality: u8,
    pub output_name: String,
    pub downloads: Vec<DownloadItem>,
    pub primary_download: Option<DownloadItem>,
    pub usage_count: Option<u64>,
    pub loading: bool,
    pub notice: Option<Notice>,
    pub batch_progress: Option<BatchProgress>,
    pub dirty: bool,
}

/// Merge button visibility and convert button label for a mode and file list.
///
/// Merging is offered in convert mode once at least one PDF is part of a
/// multi-file selection.
pub fn merge_controls(mode: ToolMode, files: &[UploadedFileRef]) -> (bool, ProcessLabel) {
    match mode {
        ToolMode::Convert => {
            let has_pdf = files.iter().any(UploadedFileRef::is_pdf);
            if has_pdf && files.len() > 1 {
                (true, ProcessLabel::ProcessPdf)
            } else {
                (false, ProcessLabel::GeneratePdf)
            }
        }
        ToolMode::Compress => (false, ProcessLabel::GeneratePdf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFileRef {
        UploadedFileRef::new(name, format!("srv_{name}"))
    }

    #[test]
    fn single_pdf_is_not_mergeable() {
        let files = vec![file("a.pdf")];
        assert_eq!(
            merge_controls(ToolMode::Convert, &files),
            (false, ProcessLabel::GeneratePdf)
        );
    }

    #[test]
    fn pdf_with_image_is_mergeable() {
        let files = vec![file("a.png"), file("b.PDF")];
        assert_eq!(
            merge_controls(ToolMode::Convert, &files),
            (true, ProcessLabel::ProcessPdf)
        );
    }

    #[test]
    fn images_only_generate_pdf() {
        let files = vec![file("a.png"), file("b.jpg"), file("c.webp")];
        assert_eq!(
            merge_controls(ToolMode::Convert, &files),
            (false, ProcessLabel::GeneratePdf)
        );
    }

    #[test]
    fn compress_mode_never_offers_merge() {
        let files = vec![file("a.pdf"), file("b.pdf")];
        assert!(!merge_controls(ToolMode::Compress, &files).0);
    }
}
