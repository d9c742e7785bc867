use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::RequestId;

/// IO the front-end must perform on behalf of the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
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
    RotatePages {
        request_id: RequestId,
        server_name: String,
        rotations: BTreeMap<u32, i32>,
    },
    DeletePages {
        request_id: RequestId,
        server_name: String,
        pages: Vec<u32>,
    },
    SaveDownload {
        request_id: RequestId,
        server_filename: String,
        save_as: String,
    },
    RefreshCounter,
}
