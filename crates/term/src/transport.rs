//! Byte-stream transport seam.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A non-blocking bidirectional byte stream.
///
/// `recv` and `send` follow `std::io` conventions: `Ok(0)` from `recv` is end
/// of stream, and an empty socket buffer surfaces as
/// [`io::ErrorKind::WouldBlock`] instead of waiting.
pub trait Transport: Send {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Shut the stream down in both directions. Errors are ignored.
    fn close(&mut self);
}

impl Transport for TcpStream {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write(buf)
    }

    fn close(&mut self) {
        let _ = self.shutdown(Shutdown::Both);
    }
}

/// Put an accepted socket into the mode the channel expects.
pub fn prepare_tcp(stream: &TcpStream) -> io::Result<()> {
    stream.set_nonblocking(true)?;
    stream.set_nodelay(true)
}

/// Errors that mean "try again later" rather than "connection gone"
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn transient_kinds() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(!is_transient(&io::Error::from(
            io::ErrorKind::ConnectionReset
        )));
    }

    #[test]
    fn tcp_recv_does_not_block() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let _client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        prepare_tcp(&server).unwrap();

        let mut buf = [0u8; 8];
        let err = server.recv(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }
}
