use crate::state::BatchCompress;
use crate::{
    merge_controls, AppState, CompressFailure, CompressedArtifact, DownloadItem, Effect, Msg,
    Notice, RequestId, ToolMode, DEFAULT_COMPRESSED_NAME, DEFAULT_EXPORT_NAME,
};

const UPLOAD_ALERT: &str = "Error uploading files.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::FilesSelected(paths) => {
            if paths.is_empty() {
                return (state, Vec::new());
            }
            state.begin_operation();
            let request_id = state.allocate_request_id();
            vec![Effect::Upload { request_id, paths }]
        }
        Msg::UploadFinished { result, .. } => {
            match result {
                // Appended even if the mode changed while the upload was in flight.
                Ok(files) => state.append_files(files),
                Err(_) => state.set_notice(Notice::Alert(UPLOAD_ALERT.to_string())),
            }
            state.end_operation();
            vec![Effect::RefreshCounter]
        }
        Msg::RemoveClicked(index) => {
            state.remove_file(index);
            Vec::new()
        }
        Msg::ClearAllClicked => {
            state.clear_files();
            Vec::new()
        }
        Msg::QualityChanged(quality) => {
            state.set_quality(quality);
            Vec::new()
        }
        Msg::OutputNameChanged(name) => {
            state.set_output_name(&name);
            Vec::new()
        }
        Msg::ConvertClicked => {
            if state.mode() != ToolMode::Convert || state.files().is_empty() {
                return (state, Vec::new());
            }
            let base = state.output_base(DEFAULT_EXPORT_NAME);
            let request_id = begin_pdf_request(&mut state, format!("{base}.pdf"));
            vec![Effect::Convert {
                request_id,
                files: state.server_names(),
                output_name: base,
            }]
        }
        Msg::MergeClicked => {
            let (merge_visible, _) = merge_controls(state.mode(), state.files());
            if !merge_visible {
                return (state, Vec::new());
            }
            let base = state.output_base(DEFAULT_EXPORT_NAME);
            let request_id = begin_pdf_request(&mut state, format!("{base}.pdf"));
            vec![Effect::Merge {
                request_id,
                files: state.server_names(),
            }]
        }
        Msg::RotateRequested { index, rotations } => {
            let Some((server_name, download_name)) = editable_pdf(&state, index) else {
                return (state, Vec::new());
            };
            if rotations.is_empty() {
                return (state, Vec::new());
            }
            let request_id = begin_pdf_request(&mut state, download_name);
            vec![Effect::RotatePages {
                request_id,
                server_name,
                rotations,
            }]
        }
        Msg::DeletePagesRequested { index, pages } => {
            let Some((server_name, download_name)) = editable_pdf(&state, index) else {
                return (state, Vec::new());
            };
            if pages.is_empty() {
                return (state, Vec::new());
            }
            let request_id = begin_pdf_request(&mut state, download_name);
            vec![Effect::DeletePages {
                request_id,
                server_name,
                pages,
            }]
        }
        Msg::PdfReady { request_id, result } => {
            let Some(name) = state.take_pdf_request(request_id) else {
                return (state, Vec::new());
            };
            // A failed request leaves the previous downloads untouched.
            if let Ok(artifact) = result {
                state.publish_pdf(DownloadItem {
                    name,
                    server_filename: artifact.filename,
                });
                state.set_notice(Notice::Success);
            }
            state.end_operation();
            vec![Effect::RefreshCounter]
        }
        Msg::BatchCompressClicked => start_batch(&mut state),
        Msg::CompressFinished {
            request_id,
            index,
            result,
        } => compress_finished(&mut state, request_id, index, result),
        Msg::SaveRequested(target) => {
            let items: Vec<DownloadItem> = match target {
                Some(index) => state.download(index).cloned().into_iter().collect(),
                None => state.downloads().to_vec(),
            };
            items
                .into_iter()
                .map(|item| {
                    state.begin_operation();
                    Effect::SaveDownload {
                        request_id: state.allocate_request_id(),
                        server_filename: item.server_filename,
                        save_as: item.name,
                    }
                })
                .collect()
        }
        Msg::SaveFinished { result, .. } => {
            if let Err(message) = result {
                state.set_notice(Notice::Alert(format!("Error saving download: {message}")));
            }
            state.end_operation();
            Vec::new()
        }
        Msg::CounterTick => vec![Effect::RefreshCounter],
        Msg::CounterLoaded(result) => {
            if let Ok(count) = result {
                state.set_usage_count(count);
            }
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_pdf_request(state: &mut AppState, download_name: String) -> RequestId {
    state.begin_operation();
    let request_id = state.allocate_request_id();
    state.track_pdf_request(request_id, download_name);
    request_id
}

/// Server name and download name for an uploaded PDF at `index`.
fn editable_pdf(state: &AppState, index: usize) -> Option<(String, String)> {
    if state.mode() != ToolMode::Convert {
        return None;
    }
    let file = state.file(index).filter(|file| file.is_pdf())?;
    Some((
        file.server_name.clone(),
        format!("{}_edited.pdf", file.stem()),
    ))
}

fn compressed_name(base: &str, index: usize) -> String {
    format!("{base}_{}.jpg", index + 1)
}

fn start_batch(state: &mut AppState) -> Vec<Effect> {
    if state.mode() != ToolMode::Compress || state.files().is_empty() || state.batch().is_some() {
        return Vec::new();
    }
    state.reset_downloads_for_batch();
    let base = state.output_base(DEFAULT_COMPRESSED_NAME);
    let quality = state.quality();
    let files = state.server_names();
    let server_name = files[0].clone();

    state.begin_operation();
    let request_id = state.allocate_request_id();
    state.start_batch(BatchCompress {
        base,
        quality,
        files,
        current: 0,
        request_id,
    });
    vec![Effect::Compress {
        request_id,
        index: 0,
        server_name,
        quality,
    }]
}

fn compress_finished(
    state: &mut AppState,
    request_id: RequestId,
    index: usize,
    result: Result<CompressedArtifact, CompressFailure>,
) -> Vec<Effect> {
    let Some(batch) = state.batch() else {
        return Vec::new();
    };
    if batch.request_id != request_id || batch.current != index {
        return Vec::new();
    }
    let name = compressed_name(&batch.base, index);
    let next = batch
        .files
        .get(index + 1)
        .map(|server_name| (server_name.clone(), batch.quality));

    match result {
        Ok(artifact) => state.push_download(DownloadItem {
            name,
            server_filename: artifact.filename,
        }),
        Err(CompressFailure::Rejected(_)) => {}
        Err(CompressFailure::Transport(_)) => {
            end_batch(state);
            return vec![Effect::RefreshCounter];
        }
    }

    match next {
        Some((server_name, quality)) => {
            let request_id = state.allocate_request_id();
            if let Some(batch) = state.batch_mut() {
                batch.current = index + 1;
                batch.request_id = request_id;
            }
            state.mark_dirty();
            vec![Effect::Compress {
                request_id,
                index: index + 1,
                server_name,
                quality,
            }]
        }
        None => {
            end_batch(state);
            state.set_notice(Notice::Success);
            vec![Effect::RefreshCounter]
        }
    }
}

fn end_batch(state: &mut AppState) {
    state.finish_batch();
    state.end_operation();
}
