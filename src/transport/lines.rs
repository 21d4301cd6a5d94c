use crate::Result;
use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use super::{Transport, TransportFuture};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

const TRACE_LOG_MAX_BYTES: usize = 1024;
const TRACE_TRUNCATE_SUFFIX: &str = "... (truncated)";

/// Newline-delimited JSON link to a voice runtime.
///
/// Each inbound line is one [`ServerEvent`]; each outbound [`ClientEvent`] is
/// written as one line and flushed. Blank lines are skipped.
///
/// `next_event` is cancel safe: bytes of a partly read line stay buffered
/// until the rest arrives, so it can be raced in `tokio::select!`.
pub struct JsonLinesTransport<R, W> {
    reader: R,
    writer: W,
    pending: Vec<u8>,
}

impl<R, W> JsonLinesTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: Vec::new(),
        }
    }

    /// Send a client event.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let mut json = serde_json::to_string(event)?;
        tracing::trace!(kind = event.kind(), "Sending event: {}", safe_truncate(&json, TRACE_LOG_MAX_BYTES));
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive the next runtime event; `None` at end of input.
    ///
    /// # Errors
    /// Returns an error if the read fails or a line is not a valid event.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        loop {
            // `read_until` appends to `pending`, so a cancelled read loses nothing.
            let read = self.reader.read_until(b'\n', &mut self.pending).await?;
            if read == 0 && self.pending.is_empty() {
                return Ok(None);
            }
            let line = std::mem::take(&mut self.pending);
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            tracing::trace!("Received event: {}", safe_truncate(text, TRACE_LOG_MAX_BYTES));
            return Ok(Some(serde_json::from_str(text)?));
        }
    }
}

impl JsonLinesTransport<BufReader<Stdin>, Stdout> {
    /// Talk to the runtime over this process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport for JsonLinesTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, Result<()>> {
        Box::pin(async move { Self::send(self, &event).await })
    }

    fn next_event(&mut self) -> TransportFuture<'_, Result<Option<ServerEvent>>> {
        Box::pin(async move { Self::next_event(self).await })
    }
}

fn safe_truncate(s: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if s.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(s);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!(
        "{} {} {} bytes",
        &s[..end],
        TRACE_TRUNCATE_SUFFIX,
        s.len() - end
    ))
}
