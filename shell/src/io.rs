//! stdin / stdout halves of the bridge

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use harbor_core::{encode_outbound, OutboundMessage};

pub async fn read_inbound(inbound: UnboundedSender<String>) -> anyhow::Result<()> {
    read_lines(BufReader::new(tokio::io::stdin()), inbound).await
}

/// Forward newline-delimited UTF-8 lines. Lines that are not UTF-8 are
/// dropped; only a failing reader ends the loop.
pub async fn read_lines<R>(mut reader: R, inbound: UnboundedSender<String>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut line_no: u64 = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;

        let line = match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Dropping inbound line that is not UTF-8");
                continue;
            }
        };
        if inbound.send(line).is_err() {
            break;
        }
    }
    tracing::debug!(lines = line_no, "stdin closed");
    Ok(())
}

pub async fn write_outbound(mut outbound: UnboundedReceiver<OutboundMessage>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(message) = outbound.recv().await {
        let line = match encode_outbound(&message) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Outbound message not encodable");
                continue;
            }
        };
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let input: &[u8] = b"\xff\xfe\n{\"channel\":\"user-command\",\"payload\":{\"type\":\"newTab\"}}\n";
        let (tx, mut rx) = unbounded_channel();

        read_lines(input, tx).await.unwrap();

        let line = rx.recv().await.unwrap();
        assert!(line.contains("newTab"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let input: &[u8] = b"first\r\nsecond";
        let (tx, mut rx) = unbounded_channel();

        read_lines(input, tx).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("first\r\n"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
        assert!(rx.recv().await.is_none());
    }
}
