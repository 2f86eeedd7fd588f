//! Terminal channel module.
//!
//! One [`Vt100`] per connected client. Drawing calls only append VT100 codes
//! to an output buffer; nothing reaches the socket until
//! [`Vt100::flush`] pushes the whole frame in one non-blocking send. Input is
//! read the same way: whatever bytes the peer already sent are decoded into
//! plain keystrokes, and the caller never waits for more.
//!
//! - [`transport`]: the byte-stream seam and its `TcpStream` implementation
//! - [`decoder`]: escape-sequence filter for inbound bytes
//! - [`channel`]: the VT100 encoder and flush classification
//! - [`memory`]: scripted in-memory transport for tests

pub mod channel;
pub mod decoder;
pub mod memory;
pub mod transport;

pub use telnet_arcade_types as types;

pub use channel::Vt100;
pub use decoder::KeyDecoder;
pub use memory::{memory_pair, MemoryPeer, MemoryTransport, SendMode};
pub use transport::{prepare_tcp, Transport};
