use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Port tried first when none is configured explicitly.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub encoder: Encoder,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    #[serde(default = "default_http_host")]
    pub host: IpAddr,
    /// Explicit port. When unset, [`DEFAULT_PORT`] is tried and an
    /// ephemeral port is used if it is taken.
    #[serde(default = "default_http_port")]
    pub port: Option<u16>,
    #[serde(default)]
    pub cors: bool,
    /// Max request body in bytes, frame uploads included.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    /// Service root: static files are served from here and the encoder runs here.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Working directory for uploaded frames, relative to `root`.
    #[serde(default = "default_storage_frames")]
    pub frames: PathBuf,
    /// Document served for `/`.
    #[serde(default = "default_storage_index")]
    pub index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoder {
    #[serde(default = "default_encoder_program")]
    pub program: String,
    /// Output file, relative to the storage root.
    #[serde(default = "default_encoder_output")]
    pub output: String,
    /// Reject malformed encode bodies instead of falling back to defaults.
    #[serde(default)]
    pub strict_json: bool,
}

fn default_http_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_http_port() -> Option<u16> {
    env::var("PORT").ok().and_then(|p| p.trim().parse().ok())
}

fn default_body_limit() -> usize {
    128 * 1024 * 1024
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_storage_frames() -> PathBuf {
    PathBuf::from("frames")
}

fn default_storage_index() -> String {
    "index.html".to_string()
}

fn default_encoder_program() -> String {
    "ffmpeg".to_string()
}

fn default_encoder_output() -> String {
    "out.mp4".to_string()
}

impl Default for Http {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            cors: Default::default(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            frames: default_storage_frames(),
            index: default_storage_index(),
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            program: default_encoder_program(),
            output: default_encoder_output(),
            strict_json: false,
        }
    }
}

impl Storage {
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join(&self.frames)
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_plain_relative(&self.storage.frames) {
            anyhow::bail!(
                "storage.frames must be a relative path inside the root: {}",
                self.storage.frames.display()
            );
        }
        if self.encoder.program.trim().is_empty() {
            anyhow::bail!("encoder.program cannot be empty");
        }
        if !is_plain_relative(Path::new(&self.encoder.output)) {
            anyhow::bail!(
                "encoder.output must be a relative path inside the root: {}",
                self.encoder.output
            );
        }
        Ok(())
    }
}

fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
