//! In-memory port for tests.
//!
//! Holds a byte queue for the read side and records every write. A
//! responder closure can be installed to script the module's side of the
//! conversation: it sees each written chunk and its return value is
//! appended to the read queue.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::Transport;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

#[derive(Default)]
pub struct MockPort {
    rx: Mutex<VecDeque<u8>>,
    writes: Mutex<Vec<Vec<u8>>>,
    responder: Mutex<Option<Responder>>,
    discards: Mutex<usize>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the read side, as if the module had sent them.
    pub fn push_response(&self, bytes: &[u8]) {
        self.rx.lock().extend(bytes.iter().copied());
    }

    /// Install a scripted module: called once per written chunk, its
    /// return bytes become readable.
    pub fn set_responder<F>(&self, f: F)
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        *self.responder.lock() = Some(Box::new(f));
    }

    /// Every chunk written so far, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().clone()
    }

    /// All written bytes flattened into one buffer.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.writes.lock().iter().flatten().copied().collect()
    }

    /// How many times the input buffer was discarded.
    pub fn discard_count(&self) -> usize {
        *self.discards.lock()
    }
}

#[async_trait]
impl Transport for MockPort {
    async fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.writes.lock().push(bytes.to_vec());
        let reply = self.responder.lock().as_mut().map(|f| f(bytes));
        if let Some(reply) = reply {
            self.rx.lock().extend(reply);
        }
        Ok(())
    }

    async fn read_byte(&self) -> Result<Option<u8>, TransportError> {
        Ok(self.rx.lock().pop_front())
    }

    async fn discard_input(&self) -> Result<(), TransportError> {
        self.rx.lock().clear();
        *self.discards.lock() += 1;
        Ok(())
    }

    fn port_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responder_scripts_the_module_side() {
        let port = MockPort::new();
        port.set_responder(|chunk| {
            if chunk == b"$$" {
                b"CMD\r\n".to_vec()
            } else {
                Vec::new()
            }
        });

        port.write_all(b"$$").await.unwrap();
        assert_eq!(port.read_byte().await.unwrap(), Some(b'C'));
        assert_eq!(port.writes(), vec![b"$$".to_vec()]);
    }

    #[tokio::test]
    async fn discard_clears_pending_input() {
        let port = MockPort::new();
        port.push_response(b"stale");
        port.discard_input().await.unwrap();
        assert_eq!(port.read_byte().await.unwrap(), None);
        assert_eq!(port.discard_count(), 1);
    }
}
