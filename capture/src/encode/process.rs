use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::result::Result;

const TAIL_LIMIT: usize = 4096;

/// Runs `program` to completion in `cwd`. Its stdout and stderr are copied
/// to ours as they arrive; both copies finish before the exit status is judged.
pub async fn run(program: &str, args: &[String], cwd: &Path) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!("failed to spawn {}: {}", program, e);
            AppError::SubprocessFailure {
                code: None,
                message: format!("failed to spawn {program}: {e}"),
            }
        })?;
    debug!("spawned {} (pid {:?})", program, child.id());

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("{program} stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("{program} stderr was not captured"))?;

    let (out, err, status) = tokio::join!(
        forward(stdout, tokio::io::stdout()),
        forward(stderr, tokio::io::stderr()),
        child.wait(),
    );
    if let Err(e) = &out {
        warn!("reading {} stdout: {}", program, e);
    }
    let last_line = match err {
        Ok(line) => line,
        Err(e) => {
            warn!("reading {} stderr: {}", program, e);
            None
        }
    };

    let status = status.map_err(|e| AppError::SubprocessFailure {
        code: None,
        message: format!("failed to wait for {program}: {e}"),
    })?;
    if status.success() {
        return Ok(());
    }

    let message = failure_message(program, status, last_line.as_deref());
    error!("{}", message);
    Err(AppError::SubprocessFailure {
        code: status.code(),
        message,
    })
}

fn failure_message(program: &str, status: ExitStatus, last_line: Option<&str>) -> String {
    let head = match status.code() {
        Some(code) => format!("{program} exited with code {code}"),
        None => format!("{program} was terminated by signal"),
    };
    match last_line {
        Some(line) => format!("{head}: {line}"),
        None => head,
    }
}

/// Copies `reader` into `sink` chunk by chunk and returns the last
/// non-empty line seen. A failing sink stops the copy but not the reading,
/// so the child never blocks on a full pipe.
pub(crate) async fn forward<R, W>(mut reader: R, mut sink: W) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 8192];
    let mut tail: Vec<u8> = Vec::new();
    let mut sink_ok = true;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];

        if sink_ok {
            let written = async {
                sink.write_all(chunk).await?;
                sink.flush().await
            }
            .await;
            if let Err(e) = written {
                warn!("output forwarding stopped: {}", e);
                sink_ok = false;
            }
        }

        tail.extend_from_slice(chunk);
        if tail.len() > TAIL_LIMIT {
            tail.drain(..tail.len() - TAIL_LIMIT);
        }
    }

    Ok(last_line(&tail))
}

fn last_line(tail: &[u8]) -> Option<String> {
    String::from_utf8_lossy(tail)
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
