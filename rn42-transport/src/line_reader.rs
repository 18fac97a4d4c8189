//! Line-oriented response reading
//!
//! The RN-42 answers AT commands with `\r\n`-terminated ASCII lines. The
//! reader polls the port and keeps an idle deadline that every received
//! byte pushes back out; an expired deadline hands back whatever partial
//! bytes were captured so callers can still inspect prompts the module
//! emits without a terminator (a bare `?` being the important one).

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::error::TransportError;
use crate::Transport;

/// Default idle deadline between received bytes. A quarter second of
/// silence on the 9600-baud link means the module is done talking.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(250);

/// Upper bound on a single response line. The module's longest replies
/// (settings readbacks) stay well under this.
pub const MAX_LINE_LEN: usize = 64;

/// Granularity of the wait when no byte is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A response line as captured off the wire, carriage returns stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedLine {
    bytes: Vec<u8>,
    complete: bool,
}

impl ReceivedLine {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True when a `\n` terminator arrived; false when the idle deadline
    /// expired first and [`bytes`](Self::bytes) holds a partial capture.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// First byte of the line, if any.
    pub fn first(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Exact comparison against an expected acknowledgment token.
    ///
    /// Any divergence fails, including differing lengths — a response
    /// that merely starts with the token is not an acknowledgment.
    pub fn matches(&self, expected: &[u8]) -> bool {
        self.bytes == expected
    }

    /// Lossy text rendering for logs and readback queries.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Reads `\n`-terminated lines with a per-byte idle deadline and a
/// bounded capture buffer.
#[derive(Debug, Clone)]
pub struct LineReader {
    idle_timeout: Duration,
    max_len: usize,
}

impl Default for LineReader {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_len: MAX_LINE_LEN,
        }
    }
}

impl LineReader {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Read one line from `port`.
    ///
    /// `\r` bytes are stripped on ingestion and `\n` terminates the line;
    /// both reset the idle deadline like any other byte. An expired
    /// deadline yields an incomplete line; exceeding the capture bound is
    /// an error rather than an overflow.
    pub async fn read_line(&self, port: &dyn Transport) -> Result<ReceivedLine, TransportError> {
        let mut bytes: Vec<u8> = Vec::new();
        let mut deadline = Instant::now() + self.idle_timeout;

        loop {
            match port.read_byte().await? {
                Some(b'\n') => {
                    trace!(line = %String::from_utf8_lossy(&bytes), "line complete");
                    return Ok(ReceivedLine {
                        bytes,
                        complete: true,
                    });
                }
                Some(b'\r') => {
                    deadline = Instant::now() + self.idle_timeout;
                }
                Some(b) => {
                    if bytes.len() >= self.max_len {
                        return Err(TransportError::ResponseTooLong {
                            limit: self.max_len,
                        });
                    }
                    bytes.push(b);
                    deadline = Instant::now() + self.idle_timeout;
                }
                None => {
                    if Instant::now() >= deadline {
                        trace!(
                            partial = %String::from_utf8_lossy(&bytes),
                            "idle deadline expired"
                        );
                        return Ok(ReceivedLine {
                            bytes,
                            complete: false,
                        });
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPort;

    #[tokio::test(start_paused = true)]
    async fn complete_line_strips_carriage_returns() {
        let port = MockPort::new();
        port.push_response(b"AOK\r\n");

        let line = LineReader::default().read_line(&port).await.unwrap();
        assert!(line.is_complete());
        assert_eq!(line.bytes(), b"AOK");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_deadline_returns_partial_capture() {
        let port = MockPort::new();
        port.push_response(b"CM"); // no terminator ever arrives

        let line = LineReader::new(Duration::from_millis(50))
            .read_line(&port)
            .await
            .unwrap();
        assert!(!line.is_complete());
        assert_eq!(line.bytes(), b"CM");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_timeout_yields_empty_incomplete_line() {
        let port = MockPort::new();

        let line = LineReader::new(Duration::from_millis(50))
            .read_line(&port)
            .await
            .unwrap();
        assert!(!line.is_complete());
        assert!(line.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overlong_line_is_an_error_not_an_overflow() {
        let port = MockPort::new();
        port.push_response(&[b'x'; MAX_LINE_LEN + 8]);

        let err = LineReader::default().read_line(&port).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ResponseTooLong { limit: MAX_LINE_LEN }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn question_prompt_survives_without_terminator() {
        let port = MockPort::new();
        port.push_response(b"?");

        let line = LineReader::new(Duration::from_millis(50))
            .read_line(&port)
            .await
            .unwrap();
        assert_eq!(line.first(), Some(b'?'));
    }

    #[test]
    fn matches_requires_exact_equality() {
        let line = ReceivedLine {
            bytes: b"CMD".to_vec(),
            complete: true,
        };
        assert!(line.matches(b"CMD"));
        assert!(!line.matches(b"CMX"));
        assert!(!line.matches(b"CM"));
        assert!(!line.matches(b"CMDX"));
        assert!(!line.matches(b""));
    }
}
