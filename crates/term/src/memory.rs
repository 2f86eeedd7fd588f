//! In-memory transport for tests.
//!
//! [`memory_pair`] returns the channel side ([`MemoryTransport`]) and a test
//! handle ([`MemoryPeer`]) sharing one buffer pair. The peer scripts inbound
//! bytes, inspects what the channel sent, and decides how sends behave.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::transport::Transport;

/// How the transport answers `send`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMode {
    /// Accept every byte
    #[default]
    Accept,
    /// Report `WouldBlock` without taking anything
    WouldBlock,
    /// Report a broken pipe
    Fail,
    /// Take at most this many bytes per call
    Partial(usize),
}

#[derive(Debug, Default)]
struct Shared {
    inbound: VecDeque<u8>,
    sent: Vec<u8>,
    mode: SendMode,
    hung_up: bool,
    closed: bool,
    send_calls: usize,
}

/// Channel side of an in-memory connection
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    shared: Arc<Mutex<Shared>>,
}

/// Test side of an in-memory connection
#[derive(Debug, Clone)]
pub struct MemoryPeer {
    shared: Arc<Mutex<Shared>>,
}

pub fn memory_pair() -> (MemoryTransport, MemoryPeer) {
    let shared = Arc::new(Mutex::new(Shared::default()));
    (
        MemoryTransport {
            shared: Arc::clone(&shared),
        },
        MemoryPeer { shared },
    )
}

impl Transport for MemoryTransport {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut shared = self.shared.lock();
        if shared.inbound.is_empty() {
            if shared.hung_up {
                return Ok(0);
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(shared.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(shared.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut shared = self.shared.lock();
        shared.send_calls += 1;
        match shared.mode {
            SendMode::Accept => {
                shared.sent.extend_from_slice(buf);
                Ok(buf.len())
            }
            SendMode::WouldBlock => Err(io::ErrorKind::WouldBlock.into()),
            SendMode::Fail => Err(io::ErrorKind::BrokenPipe.into()),
            SendMode::Partial(max) => {
                let n = buf.len().min(max);
                shared.sent.extend_from_slice(&buf[..n]);
                Ok(n)
            }
        }
    }

    fn close(&mut self) {
        self.shared.lock().closed = true;
    }
}

impl MemoryPeer {
    /// Queue bytes for the channel to read
    pub fn push_input(&self, bytes: &[u8]) {
        self.shared.lock().inbound.extend(bytes);
    }

    /// Take everything the channel has sent so far
    pub fn take_sent(&self) -> Vec<u8> {
        std::mem::take(&mut self.shared.lock().sent)
    }

    /// Lossy text view of [`take_sent`](Self::take_sent)
    pub fn take_text(&self) -> String {
        String::from_utf8_lossy(&self.take_sent()).into_owned()
    }

    pub fn set_send_mode(&self, mode: SendMode) {
        self.shared.lock().mode = mode;
    }

    /// End of stream once the queued input is consumed
    pub fn hang_up(&self) {
        self.shared.lock().hung_up = true;
    }

    pub fn send_calls(&self) -> usize {
        self.shared.lock().send_calls
    }

    /// Whether the channel side called `close`
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}
