#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Stands in for ffmpeg: records its arguments next to the output and
/// writes a placeholder video to the last argument.
pub const OK_ENCODER: &str = r#"#!/bin/sh
printf '%s\n' "$@" > encoder-args.txt
echo "fake encoder: $# args"
echo "frame=    5 fps=0.0 q=-1.0 Lsize=       1kB" >&2
for last; do :; done
printf 'video' > "$last"
"#;

pub const FAILING_ENCODER: &str = r#"#!/bin/sh
printf '%s\n' "$@" > encoder-args.txt
echo "frames/frame_%06d.png: No such file or directory" >&2
echo "Conversion failed!" >&2
exit 1
"#;

/// Takes long enough that a shutdown always lands mid-encode.
pub const SLOW_ENCODER: &str = r#"#!/bin/sh
sleep 5
for last; do :; done
printf 'video' > "$last"
"#;

pub fn pick_port() -> u16 {
    portpicker::pick_unused_port().expect("failed to pick unused port")
}

pub struct Service {
    pub addr: SocketAddr,
    pub root: TempDir,
}

impl Service {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.path("frames")
    }
}

pub fn config(root: &Path) -> capture::config::Config {
    let mut cfg = capture::config::Config::default();
    cfg.http.host = LOCALHOST;
    cfg.http.port = None;
    cfg.storage.root = root.to_path_buf();
    cfg
}

/// Starts a service rooted in a fresh temp dir with `encoder` as the program.
pub async fn start(encoder: &str, strict_json: bool) -> Service {
    let root = tempfile::tempdir().unwrap();
    let mut cfg = config(root.path());
    cfg.encoder.program = encoder.to_string();
    cfg.encoder.strict_json = strict_json;

    let (service, _) = spawn(cfg, root, std::future::pending()).await;
    service
}

/// Like [`start`], stopping once `signal` resolves.
pub async fn start_until<F>(encoder: &str, signal: F) -> (Service, JoinHandle<anyhow::Result<()>>)
where
    F: Future<Output = ()> + Send + 'static,
{
    let root = tempfile::tempdir().unwrap();
    let mut cfg = config(root.path());
    cfg.encoder.program = encoder.to_string();
    spawn(cfg, root, signal).await
}

async fn spawn<F>(
    cfg: capture::config::Config,
    root: TempDir,
    signal: F,
) -> (Service, JoinHandle<anyhow::Result<()>>)
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(SocketAddr::new(LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(capture::serve(cfg, listener, signal));
    (Service { addr, root }, server)
}

/// Paths of the fake encoders, shared by every test in the binary.
#[cfg(unix)]
pub struct Encoders {
    _dir: TempDir,
    pub ok: String,
    pub failing: String,
    pub slow: String,
}

/// Scripts are written once, before any of them runs. Writing an executable
/// while another thread forks can leave the write fd open in the child, and
/// exec then fails with ETXTBSY.
#[cfg(unix)]
pub fn encoders() -> &'static Encoders {
    use std::os::unix::fs::PermissionsExt;

    static ENCODERS: OnceLock<Encoders> = OnceLock::new();
    ENCODERS.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_str().unwrap().to_string()
        };
        let ok = write("ok-encoder.sh", OK_ENCODER);
        let failing = write("failing-encoder.sh", FAILING_ENCODER);
        let slow = write("slow-encoder.sh", SLOW_ENCODER);
        Encoders {
            _dir: dir,
            ok,
            failing,
            slow,
        }
    })
}

pub async fn upload(service: &Service, name: &str, bytes: Vec<u8>) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part(api::path::FRAME_FIELD, part);
    reqwest::Client::new()
        .post(service.url(api::path::FRAME))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

pub async fn encode(service: &Service, body: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(service.url(api::path::ENCODE))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}

pub fn encoder_args(service: &Service) -> Option<Vec<String>> {
    std::fs::read_to_string(service.path("encoder-args.txt"))
        .ok()
        .map(|s| s.lines().map(str::to_string).collect())
}

pub fn frame_files(service: &Service) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(service.frames_dir()) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => vec![],
    };
    names.sort();
    names
}
