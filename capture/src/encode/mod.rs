use std::path::PathBuf;

use api::request::{Codec, EncodeRequest};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::frame::SEQUENCE_PATTERN;
use crate::result::Result;
use crate::store::{FrameStore, PurgeReport};

pub mod args;
mod process;

/// A finished encode.
#[derive(Debug)]
pub struct Encoded {
    pub output: String,
    pub codec: Codec,
    pub frames: usize,
    /// Present when cleanup was requested.
    pub cleanup: Option<PurgeReport>,
}

impl Encoded {
    pub fn summary(&self) -> String {
        format!("encoded {} ({})", self.output, self.codec)
    }
}

/// Drives the external encoder over the frames in a [`FrameStore`].
///
/// Encodes are not serialized against each other or against uploads: the
/// caller is expected to finish uploading before asking for an encode, and
/// to run one encode at a time.
pub struct Encoder {
    program: String,
    cwd: PathBuf,
    input: String,
    output: String,
}

impl Encoder {
    pub fn new(cfg: &Config) -> Self {
        let input = cfg
            .storage
            .frames
            .join(SEQUENCE_PATTERN)
            .to_string_lossy()
            .to_string();
        Self {
            program: cfg.encoder.program.clone(),
            cwd: cfg.storage.root.clone(),
            input,
            output: cfg.encoder.output.clone(),
        }
    }

    pub fn args(&self, req: &EncodeRequest) -> Vec<String> {
        args::build(req, &self.input, &self.output)
    }

    pub async fn encode(&self, store: &FrameStore, req: &EncodeRequest) -> Result<Encoded> {
        let got = store.count_frames().await;
        if req.total_frames > 0 && (got as u64) < req.total_frames {
            return Err(AppError::InsufficientFrames {
                got,
                expected: req.total_frames,
            });
        }

        info!(
            "encoding {} frames as {} at {} fps into {}",
            got, req.codec, req.fps, self.output
        );
        let args = self.args(req);
        debug!("{} {}", self.program, args.join(" "));

        process::run(&self.program, &args, &self.cwd).await?;
        info!("encoded {}", self.output);

        let cleanup = if req.cleanup {
            let report = store.purge_frames().await;
            if !report.is_clean() {
                warn!(
                    "cleanup left {} frames behind after encoding {}",
                    report.failed.len(),
                    self.output
                );
            }
            Some(report)
        } else {
            None
        };

        Ok(Encoded {
            output: self.output.clone(),
            codec: req.codec,
            frames: got,
            cleanup,
        })
    }
}
