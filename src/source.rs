//! Line sources feeding producer records into the run loop.
//!
//! The sniffer is an independent process; its output reaches us as a byte
//! stream, usually a pipe on stdin. Lines are decoded lossily so a single
//! corrupt byte only spoils one record instead of ending the stream.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Channel buffer size for incoming lines.
pub const LINE_CHANNEL_BUFFER_SIZE: usize = 100;

/// A line read from the producer, or the I/O error that ended the stream.
pub type LineResult = io::Result<String>;

/// Source abstraction to enable deterministic tests without a producer process.
pub trait RecordSource: Send + Sync {
    /// Start reading. The channel closes when the producer's output ends.
    fn open(&self) -> mpsc::Receiver<LineResult>;
}

/// Reads producer lines from the process's standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl RecordSource for StdinSource {
    fn open(&self) -> mpsc::Receiver<LineResult> {
        spawn_line_reader(tokio::io::stdin())
    }
}

/// Spawn a task forwarding newline-terminated lines from `reader`.
///
/// Line endings are stripped. Must be called from within a tokio runtime.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<LineResult>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_CHANNEL_BUFFER_SIZE);

    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(Ok(line)).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    break;
                }
            }
        }
    });

    rx
}
