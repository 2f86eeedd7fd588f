//! VT100 channel: buffered control-code output and decoded keystroke input.
//!
//! All drawing calls append to one output buffer so that a game's whole frame
//! goes out in a single send. Cursor movement and visibility are encoded with
//! crossterm's ANSI commands; clears and the 8-color SGR codes are written by
//! hand because their exact byte forms (`ESC[2J`, `ESC[34m`, `ESC[104m`) differ
//! from what crossterm emits.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use crossterm::{cursor, Command, QueueableCommand};

use crate::decoder::KeyDecoder;
use crate::transport::{is_transient, Transport};
use crate::types::{
    ClearMode, Direction, FlushStatus, Shade, BEL, ESC, NEGOTIATION_PREAMBLE,
};

/// Bytes pulled from the transport per `recv` call
const READ_CHUNK: usize = 256;

/// One client's terminal
pub struct Vt100 {
    transport: Box<dyn Transport>,
    out: Vec<u8>,
    inbound: VecDeque<u8>,
    decoder: KeyDecoder,
    /// Transport failed or reached end of stream
    closed: bool,
    /// Last flush could not send everything
    congested: bool,
}

impl Vt100 {
    /// Wrap a transport and queue the telnet negotiation preamble.
    pub fn new(transport: impl Transport + 'static) -> Self {
        let mut vt = Self::bare(transport);
        vt.out.extend_from_slice(&NEGOTIATION_PREAMBLE);
        vt
    }

    /// Wrap a transport with an empty output buffer.
    pub fn bare(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            out: Vec::with_capacity(4 * 1024),
            inbound: VecDeque::new(),
            decoder: KeyDecoder::new(),
            closed: false,
            congested: false,
        }
    }

    pub fn clear_screen(&mut self, mode: ClearMode) {
        self.csi(format_args!("{}J", mode.code()));
    }

    pub fn clear_line(&mut self, mode: ClearMode) {
        self.csi(format_args!("{}K", mode.code()));
    }

    /// Move the cursor to column `x`, row `y` (both 0-based).
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        self.queue(cursor::MoveTo(x, y));
    }

    pub fn set_foreground(&mut self, shade: Shade) {
        let base = if shade.bright { 9 } else { 3 };
        self.csi(format_args!("{}{}m", base, shade.color.code()));
    }

    pub fn set_background(&mut self, shade: Shade) {
        let base = if shade.bright { 10 } else { 4 };
        self.csi(format_args!("{}{}m", base, shade.color.code()));
    }

    /// Paint `length` blank cells from (x, y) along `direction` in the
    /// current background color.
    pub fn draw_line(&mut self, x: u16, y: u16, direction: Direction, length: u16) {
        match direction {
            Direction::Horizontal => {
                self.set_cursor(x, y);
                self.out.extend(std::iter::repeat(b' ').take(length as usize));
            }
            Direction::Vertical => {
                for i in 0..length {
                    self.set_cursor(x, y + i);
                    self.out.push(b' ');
                }
            }
        }
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        if visible {
            self.queue(cursor::Show);
        } else {
            self.queue(cursor::Hide);
        }
    }

    pub fn bell(&mut self) {
        self.out.push(BEL);
    }

    /// Full terminal reset (`ESC c`)
    pub fn reset(&mut self) {
        self.out.extend_from_slice(&[ESC, b'c']);
    }

    /// Append text; characters outside ASCII are sent as `?`.
    pub fn write_text(&mut self, text: &str) {
        self.out
            .extend(text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }));
    }

    /// Append raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Next plain keystroke the peer has already sent, if any.
    ///
    /// Never waits: once the bytes available right now are consumed this
    /// returns `None`. End of stream or a receive fault closes the channel,
    /// which the next [`flush`](Self::flush) reports as an error.
    pub fn read_char(&mut self) -> Option<u8> {
        loop {
            while let Some(byte) = self.inbound.pop_front() {
                if let Some(key) = self.decoder.feed(byte) {
                    return Some(key);
                }
            }
            if self.closed || !self.fill_inbound() {
                return None;
            }
        }
    }

    /// Pull one chunk from the transport; false when nothing was read.
    fn fill_inbound(&mut self) -> bool {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.transport.recv(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    return false;
                }
                Ok(n) => {
                    self.inbound.extend(&chunk[..n]);
                    return true;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) if is_transient(&err) => return false,
                Err(_) => {
                    self.closed = true;
                    return false;
                }
            }
        }
    }

    /// Send the buffered output in one non-blocking attempt.
    ///
    /// On [`FlushStatus::Timeout`] the unsent bytes stay buffered and go out
    /// ahead of anything drawn later. [`FlushStatus::Error`] means the
    /// connection is dead; it is reported again on every later call.
    pub fn flush(&mut self) -> FlushStatus {
        if self.closed {
            return FlushStatus::Error;
        }
        if self.out.is_empty() {
            self.congested = false;
            return FlushStatus::Success;
        }

        loop {
            match self.transport.send(&self.out) {
                Ok(n) if n == self.out.len() => {
                    self.out.clear();
                    self.congested = false;
                    return FlushStatus::Success;
                }
                Ok(0) => {
                    self.closed = true;
                    return FlushStatus::Error;
                }
                Ok(n) => {
                    self.out.drain(..n);
                    self.congested = true;
                    return FlushStatus::Timeout;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) if is_transient(&err) => {
                    self.congested = true;
                    return FlushStatus::Timeout;
                }
                Err(_) => {
                    self.closed = true;
                    return FlushStatus::Error;
                }
            }
        }
    }

    /// Bytes waiting for the next flush
    pub fn pending(&self) -> &[u8] {
        &self.out
    }

    /// Drop everything queued since the last successful flush
    pub fn discard_pending(&mut self) {
        self.out.clear();
    }

    /// True after a flush that could not send the whole buffer, until a
    /// flush succeeds. Games skip drawing new frames while congested.
    pub fn is_congested(&self) -> bool {
        self.congested
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shut the transport down. Buffered output is dropped.
    pub fn close(&mut self) {
        self.out.clear();
        self.closed = true;
        self.transport.close();
    }

    fn queue(&mut self, command: impl Command) {
        // writing into a Vec cannot fail
        let _ = self.out.queue(command);
    }

    fn csi(&mut self, args: fmt::Arguments<'_>) {
        self.out.extend_from_slice(&[ESC, b'[']);
        let _ = self.out.write_fmt(args);
    }
}

impl fmt::Debug for Vt100 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vt100")
            .field("pending", &self.out.len())
            .field("closed", &self.closed)
            .field("congested", &self.congested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{memory_pair, SendMode};
    use crate::types::Color;

    fn channel() -> (Vt100, crate::memory::MemoryPeer) {
        let (transport, peer) = memory_pair();
        (Vt100::bare(transport), peer)
    }

    #[test]
    fn new_queues_negotiation_preamble() {
        let (transport, peer) = memory_pair();
        let mut vt = Vt100::new(transport);
        vt.bell();
        assert_eq!(vt.flush(), FlushStatus::Success);
        assert_eq!(peer.take_sent(), [0xFF, 0xFB, 0x01, 0xFF, 0xFB, 0x03, 0x07]);
    }

    #[test]
    fn cursor_position_is_one_based_row_first() {
        let (mut vt, _) = channel();
        vt.set_cursor(0, 0);
        vt.set_cursor(33, 2);
        assert_eq!(vt.pending(), b"\x1b[1;1H\x1b[3;34H");
    }

    #[test]
    fn clear_codes() {
        let (mut vt, _) = channel();
        vt.clear_screen(ClearMode::Entire);
        vt.clear_screen(ClearMode::CursorToEnd);
        vt.clear_line(ClearMode::StartToCursor);
        assert_eq!(vt.pending(), b"\x1b[2J\x1b[0J\x1b[1K");
    }

    #[test]
    fn color_codes() {
        let (mut vt, _) = channel();
        vt.set_foreground(Shade::normal(Color::Red));
        vt.set_foreground(Shade::bright(Color::White));
        vt.set_background(Shade::normal(Color::Blue));
        vt.set_background(Shade::bright(Color::Cyan));
        assert_eq!(vt.pending(), b"\x1b[31m\x1b[97m\x1b[44m\x1b[106m");
    }

    #[test]
    fn cursor_visibility_bell_and_reset() {
        let (mut vt, _) = channel();
        vt.set_cursor_visible(false);
        vt.set_cursor_visible(true);
        vt.bell();
        vt.reset();
        assert_eq!(vt.pending(), b"\x1b[?25l\x1b[?25h\x07\x1bc");
    }

    #[test]
    fn draw_line_both_directions() {
        let (mut vt, _) = channel();
        vt.draw_line(1, 2, Direction::Horizontal, 3);
        assert_eq!(vt.pending(), b"\x1b[3;2H   ");
        vt.discard_pending();

        vt.draw_line(4, 0, Direction::Vertical, 2);
        assert_eq!(vt.pending(), b"\x1b[1;5H \x1b[2;5H ");
    }

    #[test]
    fn write_text_replaces_non_ascii() {
        let (mut vt, _) = channel();
        vt.write_text("Score: 12é");
        assert_eq!(vt.pending(), b"Score: 12?");
    }

    #[test]
    fn empty_flush_is_success_without_send() {
        let (mut vt, peer) = channel();
        assert_eq!(vt.flush(), FlushStatus::Success);
        assert_eq!(peer.send_calls(), 0);
    }

    #[test]
    fn would_block_keeps_buffer_for_retry() {
        let (mut vt, peer) = channel();
        peer.set_send_mode(SendMode::WouldBlock);
        vt.write_text("frame");
        assert_eq!(vt.flush(), FlushStatus::Timeout);
        assert!(vt.is_congested());
        assert_eq!(vt.pending(), b"frame");

        peer.set_send_mode(SendMode::Accept);
        assert_eq!(vt.flush(), FlushStatus::Success);
        assert!(!vt.is_congested());
        assert_eq!(peer.take_sent(), b"frame");
    }

    #[test]
    fn partial_send_keeps_unsent_suffix() {
        let (mut vt, peer) = channel();
        peer.set_send_mode(SendMode::Partial(2));
        vt.write_text("abcde");
        assert_eq!(vt.flush(), FlushStatus::Timeout);
        assert_eq!(vt.pending(), b"cde");

        peer.set_send_mode(SendMode::Accept);
        vt.write_text("f");
        assert_eq!(vt.flush(), FlushStatus::Success);
        assert_eq!(peer.take_sent(), b"abcdef");
    }

    #[test]
    fn send_fault_is_sticky_error() {
        let (mut vt, peer) = channel();
        peer.set_send_mode(SendMode::Fail);
        vt.write_text("x");
        assert_eq!(vt.flush(), FlushStatus::Error);
        assert!(vt.is_closed());

        peer.set_send_mode(SendMode::Accept);
        assert_eq!(vt.flush(), FlushStatus::Error);
        assert_eq!(peer.send_calls(), 1);
    }

    #[test]
    fn read_char_filters_escapes_and_never_blocks() {
        let (mut vt, peer) = channel();
        assert_eq!(vt.read_char(), None);

        peer.push_input(b"z\x1b[Dx");
        assert_eq!(vt.read_char(), Some(b'z'));
        assert_eq!(vt.read_char(), Some(b'x'));
        assert_eq!(vt.read_char(), None);
        assert!(!vt.is_closed());
    }

    #[test]
    fn eof_closes_channel_and_flush_reports_error() {
        let (mut vt, peer) = channel();
        peer.push_input(b"e");
        peer.hang_up();
        assert_eq!(vt.read_char(), Some(b'e'));
        assert_eq!(vt.read_char(), None);
        assert!(vt.is_closed());
        assert_eq!(vt.flush(), FlushStatus::Error);
    }

    #[test]
    fn close_reaches_transport() {
        let (mut vt, peer) = channel();
        vt.write_text("bye");
        vt.close();
        assert!(peer.is_closed());
        assert!(vt.pending().is_empty());
    }
}
