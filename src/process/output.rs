//! Forwarding of daemon stdout/stderr into the tracing pipeline.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Child;

/// Take the child's piped output streams and log each line under the
/// `daemon` target. The pump tasks end on their own at EOF.
///
/// Lines are split on raw bytes, so output that is not UTF-8 is logged
/// lossily instead of closing the pipe under the daemon.
pub(crate) fn forward_output(child: &mut Child, pid: Option<u32>) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump(BufReader::new(stdout), pid, "stdout"));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump(BufReader::new(stderr), pid, "stderr"));
    }
}

/// Log lines until EOF or a read error. Returns the number of lines logged.
async fn pump<R>(reader: R, pid: Option<u32>, stream: &'static str) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');
    let mut logged = 0;
    loop {
        match segments.next_segment().await {
            Ok(Some(segment)) => {
                let line = String::from_utf8_lossy(trim_cr(&segment));
                tracing::info!(target: "daemon", pid, stream, "{}", line);
                logged += 1;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(target: "daemon", pid, stream, error = %e, "Daemon output closed");
                break;
            }
        }
    }
    logged
}

fn trim_cr(segment: &[u8]) -> &[u8] {
    segment.strip_suffix(b"\r").unwrap_or(segment)
}
