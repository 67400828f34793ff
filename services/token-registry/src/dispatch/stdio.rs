//! Newline-delimited JSON call loop.
//!
//! Each input line is a [`CallRequest`]; each produces exactly one
//! [`CallReply`] line. Blank lines are skipped.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use super::{CallReply, CallRequest, Dispatcher};
use crate::error::RegistryError;

/// Serve calls from `reader` until end of input, writing replies to `writer`.
///
/// When `state_file` is set, a snapshot is written after every update call
/// and once more at end of input. Returns the number of calls served.
///
/// # Errors
///
/// Returns an error if reading, writing or saving the snapshot fails.
pub async fn serve<R, W>(
    dispatcher: &Dispatcher,
    reader: R,
    mut writer: W,
    state_file: Option<&Path>,
) -> Result<usize, RegistryError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0;

    while let Some(line) = lines.next_line().await.map_err(|e| io_failure("Read", e))? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<CallRequest>(&line) {
            Ok(request) => {
                let reply = dispatcher.handle(&request).await;
                if dispatcher.is_update(&request.method) {
                    if let Some(path) = state_file {
                        dispatcher.app().snapshot().await.save(path).await?;
                    }
                }
                reply
            }
            Err(e) => {
                error!(error = %e, "Malformed call request");
                CallReply::Reject(format!("Malformed request: {}", e))
            }
        };

        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        writer
            .write_all(&out)
            .await
            .map_err(|e| io_failure("Write", e))?;
        writer.flush().await.map_err(|e| io_failure("Write", e))?;
        served += 1;
    }

    if let Some(path) = state_file {
        dispatcher.app().snapshot().await.save(path).await?;
    }
    info!(served, "Input closed");
    Ok(served)
}

fn io_failure(action: &str, e: std::io::Error) -> RegistryError {
    RegistryError::storage(format!("{} failed: {}", action, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{App, ManualClock};
    use crate::storage::Snapshot;
    use dip721_interface::InterfaceFlavor;
    use std::sync::Arc;
    use test_utils::fixtures::{alice, custodian, init_data};

    fn dispatcher() -> Dispatcher {
        let app = App::init(init_data(), Arc::new(ManualClock::new(0)));
        Dispatcher::new(app, InterfaceFlavor::Bare)
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let dispatcher = dispatcher();
        let input = format!(
            "{{\"caller\":\"{c}\",\"method\":\"mint\",\"args\":[\"{a}\",\"1\",[]]}}\n\n\
             {{\"caller\":\"{a}\",\"method\":\"total_supply\"}}\n\
             not json\n",
            c = custodian(),
            a = alice()
        );
        let expected = "{\"reply\":[{\"Ok\":\"0\"}]}\n\
                        {\"reply\":[\"1\"]}\n";

        let mut output = Vec::new();
        let served = serve(&dispatcher, input.as_bytes(), &mut output, None)
            .await
            .unwrap();
        assert_eq!(served, 3);

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(format!("{}\n{}\n", lines[0], lines[1]), expected);
        assert!(lines[2].starts_with("{\"reject\":\"Malformed request"));
    }

    #[tokio::test]
    async fn test_serve_mock_io() {
        let dispatcher = dispatcher();
        let request = format!(
            "{{\"caller\":\"{}\",\"method\":\"total_supply\",\"args\":[]}}\n",
            alice()
        );

        let mock = tokio_test::io::Builder::new()
            .read(request.as_bytes())
            .build();
        let reader = tokio::io::BufReader::new(mock);
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"reply\":[\"0\"]}\n")
            .build();

        let served = serve(&dispatcher, reader, writer, None).await.unwrap();
        assert_eq!(served, 1);
    }

    #[tokio::test]
    async fn test_serve_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let dispatcher = dispatcher();
        let input = format!(
            "{{\"caller\":\"{c}\",\"method\":\"mint\",\"args\":[\"{a}\",\"7\",[]]}}\n",
            c = custodian(),
            a = alice()
        );

        let sink = tokio::io::sink();
        serve(&dispatcher, input.as_bytes(), sink, Some(&path))
            .await
            .unwrap();

        let snapshot = Snapshot::load(&path).await.unwrap().unwrap();
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.transactions.len(), 1);
    }
}
