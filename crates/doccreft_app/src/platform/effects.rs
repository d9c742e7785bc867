use std::sync::mpsc;
use std::thread;

use doccreft_core::{
    CompressFailure, CompressedArtifact, Effect, Msg, PdfArtifact, UploadedFileRef,
};
use doccreft_engine::{EngineEvent, EngineHandle};
use doccreft_logging::{dc_debug, dc_info};

use super::app::Input;

/// Where the shell sends the effects returned by `update`.
pub trait EffectSink {
    fn run(&self, effects: Vec<Effect>);
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// Wraps the engine and forwards its events to the shell as messages.
    pub fn new(
        engine: EngineHandle,
        events: mpsc::Receiver<EngineEvent>,
        input_tx: mpsc::Sender<Input>,
    ) -> Self {
        thread::spawn(move || {
            for event in events {
                if input_tx.send(Input::Background(map_event(event))).is_err() {
                    break;
                }
            }
            dc_debug!("engine event forwarder stopped");
        });
        Self { engine }
    }
}

impl EffectSink for EffectRunner {
    fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload { request_id, paths } => {
                    dc_info!("Upload request_id={} files={:?}", request_id, paths);
                    self.engine.upload(request_id, paths);
                }
                Effect::Convert {
                    request_id,
                    files,
                    output_name,
                } => {
                    dc_info!(
                        "Convert request_id={} files={} output_name={}",
                        request_id,
                        files.len(),
                        output_name
                    );
                    self.engine.convert(request_id, files, output_name);
                }
                Effect::Merge { request_id, files } => {
                    dc_info!("Merge request_id={} files={}", request_id, files.len());
                    self.engine.merge(request_id, files);
                }
                Effect::Compress {
                    request_id,
                    index,
                    server_name,
                    quality,
                } => {
                    dc_info!(
                        "Compress request_id={} index={} quality={}",
                        request_id,
                        index,
                        quality
                    );
                    self.engine.compress(request_id, index, server_name, quality);
                }
                Effect::RotatePages {
                    request_id,
                    server_name,
                    rotations,
                } => {
                    dc_info!("RotatePages request_id={} {:?}", request_id, rotations);
                    self.engine.rotate(request_id, server_name, rotations);
                }
                Effect::DeletePages {
                    request_id,
                    server_name,
                    pages,
                } => {
                    dc_info!("DeletePages request_id={} {:?}", request_id, pages);
                    self.engine.delete_pages(request_id, server_name, pages);
                }
                Effect::SaveDownload {
                    request_id,
                    server_filename,
                    save_as,
                } => {
                    dc_info!("SaveDownload request_id={} as {}", request_id, save_as);
                    self.engine.save(request_id, server_filename, save_as);
                }
                Effect::RefreshCounter => self.engine.refresh_counter(),
            }
        }
    }
}

/// Translates an engine result into the core's message vocabulary.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::CounterLoaded(result) => Msg::CounterLoaded(result.map_err(|e| e.to_string())),
        EngineEvent::Uploaded { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result
                .map(|files| {
                    files
                        .into_iter()
                        .map(|f| UploadedFileRef::new(f.original_name, f.server_name))
                        .collect()
                })
                .map_err(|e| e.to_string()),
        },
        EngineEvent::PdfReady { request_id, result } => Msg::PdfReady {
            request_id,
            result: result
                .map(|output| PdfArtifact {
                    pdf_url: output.pdf_url,
                    filename: output.filename,
                })
                .map_err(|e| e.to_string()),
        },
        EngineEvent::Compressed {
            request_id,
            index,
            result,
        } => Msg::CompressFinished {
            request_id,
            index,
            result: result
                .map(|output| CompressedArtifact {
                    url: output.url,
                    filename: output.filename,
                })
                .map_err(|e| {
                    if e.is_rejection() {
                        CompressFailure::Rejected(e.to_string())
                    } else {
                        CompressFailure::Transport(e.to_string())
                    }
                }),
        },
        EngineEvent::Saved { request_id, result } => Msg::SaveFinished {
            request_id,
            result: result.map_err(|e| e.to_string()),
        },
    }
}
