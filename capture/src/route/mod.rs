use std::sync::Arc;

use crate::config::Config;
use crate::encode::Encoder;
use crate::resolver::PathResolver;
use crate::store::FrameStore;

pub mod encode;
pub mod fallback;
pub mod frame;

/// Everything a request handler may touch. Built once per [`crate::serve`]
/// call, so several services can run side by side in one process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<FrameStore>,
    pub encoder: Arc<Encoder>,
    pub resolver: Arc<PathResolver>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(FrameStore::new(config.storage.frames_dir())),
            encoder: Arc::new(Encoder::new(&config)),
            resolver: Arc::new(PathResolver::new(
                config.storage.root.clone(),
                config.storage.index.clone(),
            )),
            config,
        }
    }
}
