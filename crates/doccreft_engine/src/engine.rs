use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use doccreft_logging::{dc_debug, dc_error, dc_info, dc_warn};

use crate::client::{ClientSettings, DocApi, ReqwestDocApi};
use crate::persist::DownloadStore;
use crate::{ApiError, EngineEvent, FailureKind, PdfOutput, RequestId};

enum EngineCommand {
    RefreshCounter,
    Upload {
        request_id: RequestId,
        paths: Vec<PathBuf>,
    },
    Convert {
        request_id: RequestId,
        files: Vec<String>,
        output_name: String,
    },
    Merge {
        request_id: RequestId,
        files: Vec<String>,
    },
    Compress {
        request_id: RequestId,
        index: usize,
        server_name: String,
        quality: u8,
    },
    Rotate {
        request_id: RequestId,
        server_name: String,
        rotations: BTreeMap<u32, i32>,
    },
    DeletePages {
        request_id: RequestId,
        server_name: String,
        pages: Vec<u32>,
    },
    Save {
        request_id: RequestId,
        server_filename: String,
        save_as: String,
    },
}

/// Handle to the IO worker: a dedicated thread running a tokio runtime.
///
/// Commands are fire-and-forget; every command produces exactly one
/// [`EngineEvent`] on the receiver returned by [`EngineHandle::spawn`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Starts the worker against the real backend.
    pub fn new(
        settings: ClientSettings,
        download_dir: PathBuf,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), ApiError> {
        let api = Arc::new(ReqwestDocApi::new(settings)?);
        Self::spawn(api, DownloadStore::new(download_dir))
    }

    /// Starts the worker with any [`DocApi`] implementation.
    pub fn spawn(
        api: Arc<dyn DocApi>,
        store: DownloadStore,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ApiError::new(FailureKind::Io, format!("tokio runtime: {err}")))?;
        let store = Arc::new(store);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let store = store.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(api.as_ref(), &store, command).await;
                    let _ = event_tx.send(event);
                });
            }
            dc_debug!("engine command channel closed; worker exiting");
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn refresh_counter(&self) {
        self.send(EngineCommand::RefreshCounter);
    }

    pub fn upload(&self, request_id: RequestId, paths: Vec<PathBuf>) {
        self.send(EngineCommand::Upload { request_id, paths });
    }

    pub fn convert(&self, request_id: RequestId, files: Vec<String>, output_name: String) {
        self.send(EngineCommand::Convert {
            request_id,
            files,
            output_name,
        });
    }

    pub fn merge(&self, request_id: RequestId, files: Vec<String>) {
        self.send(EngineCommand::Merge { request_id, files });
    }

    pub fn compress(&self, request_id: RequestId, index: usize, server_name: String, quality: u8) {
        self.send(EngineCommand::Compress {
            request_id,
            index,
            server_name,
            quality,
        });
    }

    pub fn rotate(
        &self,
        request_id: RequestId,
        server_name: String,
        rotations: BTreeMap<u32, i32>,
    ) {
        self.send(EngineCommand::Rotate {
            request_id,
            server_name,
            rotations,
        });
    }

    pub fn delete_pages(&self, request_id: RequestId, server_name: String, pages: Vec<u32>) {
        self.send(EngineCommand::DeletePages {
            request_id,
            server_name,
            pages,
        });
    }

    pub fn save(&self, request_id: RequestId, server_filename: String, save_as: String) {
        self.send(EngineCommand::Save {
            request_id,
            server_filename,
            save_as,
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dc_error!("engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    api: &dyn DocApi,
    store: &Arc<DownloadStore>,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::RefreshCounter => {
            let result = api.usage_count().await;
            log_counter_result(&result);
            EngineEvent::CounterLoaded(result)
        }
        EngineCommand::Upload { request_id, paths } => {
            let result = api.upload(&paths).await;
            match &result {
                Ok(files) => dc_info!("upload #{} accepted {} file(s)", request_id, files.len()),
                Err(err) => dc_error!("upload #{} failed: {}", request_id, err),
            }
            EngineEvent::Uploaded { request_id, result }
        }
        EngineCommand::Convert {
            request_id,
            files,
            output_name,
        } => {
            let result = api.convert(&files, &output_name).await;
            log_pdf_result("convert", request_id, &result);
            EngineEvent::PdfReady { request_id, result }
        }
        EngineCommand::Merge { request_id, files } => {
            let result = api.merge(&files).await;
            log_pdf_result("merge", request_id, &result);
            EngineEvent::PdfReady { request_id, result }
        }
        EngineCommand::Compress {
            request_id,
            index,
            server_name,
            quality,
        } => {
            let result = api.compress(&server_name, quality).await;
            match &result {
                Ok(output) => dc_info!(
                    "compress #{} file {} -> {}",
                    request_id,
                    index,
                    output.filename
                ),
                Err(err) if err.is_rejection() => {
                    dc_warn!("compress #{} file {} rejected: {}", request_id, index, err)
                }
                Err(err) => dc_error!("compress #{} file {} failed: {}", request_id, index, err),
            }
            EngineEvent::Compressed {
                request_id,
                index,
                result,
            }
        }
        EngineCommand::Rotate {
            request_id,
            server_name,
            rotations,
        } => {
            let result = api.rotate(&server_name, &rotations).await;
            log_pdf_result("rotate", request_id, &result);
            EngineEvent::PdfReady { request_id, result }
        }
        EngineCommand::DeletePages {
            request_id,
            server_name,
            pages,
        } => {
            let result = api.delete_pages(&server_name, &pages).await;
            log_pdf_result("delete-pages", request_id, &result);
            EngineEvent::PdfReady { request_id, result }
        }
        EngineCommand::Save {
            request_id,
            server_filename,
            save_as,
        } => {
            let result = save_download(api, store.clone(), &server_filename, save_as).await;
            match &result {
                Ok(path) => dc_info!("save #{} wrote {:?}", request_id, path),
                Err(err) => dc_error!("save #{} of {} failed: {}", request_id, server_filename, err),
            }
            EngineEvent::Saved { request_id, result }
        }
    }
}

async fn save_download(
    api: &dyn DocApi,
    store: Arc<DownloadStore>,
    server_filename: &str,
    save_as: String,
) -> Result<PathBuf, ApiError> {
    let bytes = api.download(server_filename).await?;
    let path = tokio::task::spawn_blocking(move || store.save(&save_as, &bytes))
        .await
        .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))??;
    Ok(path)
}

/// Logs a counter refresh and returns the level it was logged at.
fn log_counter_result(result: &Result<u64, ApiError>) -> log::Level {
    match result {
        Ok(count) => {
            dc_debug!("usage counter at {}", count);
            log::Level::Debug
        }
        Err(err) => {
            dc_warn!("usage counter refresh failed: {}", err);
            log::Level::Warn
        }
    }
}

fn log_pdf_result(action: &str, request_id: RequestId, result: &Result<PdfOutput, ApiError>) {
    match result {
        Ok(output) => dc_info!("{} #{} produced {}", action, request_id, output.filename),
        Err(err) => dc_error!("{} #{} failed: {}", action, request_id, err),
    }
}
