//! Stream records.
//!
//! A stream unifies memory buffers, files, and window output behind one
//! read/write/seek surface. The session routes every operation through
//! the variant here; window streams additionally forward into the
//! window tree and its echo chain, which the session owns.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fictui_core::Id;
use tracing::warn;

use crate::window::WindowId;

/// Handle to a [`Stream`].
pub type StreamId = Id<Stream>;

/// Access mode for opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Read only.
    Read,
    /// Write only; truncates an existing file.
    Write,
    /// Read and write; the file must already exist.
    ReadWrite,
    /// Write only, appending to an existing file.
    WriteAppend,
}

/// Origin for a seek operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// From the start of the data.
    Start,
    /// From the current position.
    Current,
    /// From the logical end of the data.
    End,
}

/// Final accounting returned when a stream (or its owning window)
/// closes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamResult {
    /// Units read over the stream's lifetime.
    pub read_count: u32,
    /// Units written over the stream's lifetime, counting attempts that
    /// were truncated or rejected.
    pub write_count: u32,
    /// For memory streams, the buffer handed over at open time.
    pub buffer: Option<Vec<u8>>,
}

/// Backing storage of a memory stream.
///
/// The buffer is supplied at open time and never grows; `highwater`
/// tracks the furthest position ever written (or the full length for
/// read-opened streams) and bounds both reads and seeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBuf {
    data: Vec<u8>,
    cursor: usize,
    highwater: usize,
}

impl MemoryBuf {
    /// Wrap a buffer whose entire contents are readable.
    #[must_use]
    pub fn for_reading(data: Vec<u8>) -> Self {
        let highwater = data.len();
        Self {
            data,
            cursor: 0,
            highwater,
        }
    }

    /// Wrap a buffer with nothing readable until written.
    #[must_use]
    pub fn for_writing(data: Vec<u8>) -> Self {
        Self {
            data,
            cursor: 0,
            highwater: 0,
        }
    }

    /// Current cursor position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Logical end of valid data (distinct from capacity).
    #[must_use]
    pub fn highwater(&self) -> usize {
        self.highwater
    }

    /// Store bytes at the cursor, silently truncating at capacity, and
    /// advance the high-water mark past anything newly written.
    pub fn write(&mut self, buf: &[u8]) {
        let room = self.data.len().saturating_sub(self.cursor);
        let len = buf.len().min(room);
        if len > 0 {
            self.data[self.cursor..self.cursor + len].copy_from_slice(&buf[..len]);
            self.cursor += len;
            self.highwater = self.highwater.max(self.cursor);
        }
    }

    /// The byte at the cursor, if the cursor is below the high-water
    /// mark.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.cursor < self.highwater {
            let ch = self.data[self.cursor];
            self.cursor += 1;
            Some(ch)
        } else {
            None
        }
    }

    /// Move the cursor, clamped into `[0, highwater]`.
    pub fn seek(&mut self, pos: i32, mode: SeekMode) {
        let base = match mode {
            SeekMode::Start => 0,
            SeekMode::Current => self.cursor as i64,
            SeekMode::End => self.highwater as i64,
        };
        let target = base + pos as i64;
        self.cursor = target.clamp(0, self.highwater as i64) as usize;
    }

    /// Give the buffer back, e.g. when the stream closes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Backing storage of a file stream.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    /// Declared by the file reference; no byte translation happens on
    /// this platform.
    pub textmode: bool,
}

impl FileStream {
    /// Open `path` in the native mode matching `mode`.
    pub fn open(path: &Path, textmode: bool, mode: FileMode) -> std::io::Result<Self> {
        let mut options = OpenOptions::new();
        match mode {
            FileMode::Read => options.read(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::ReadWrite => options.read(true).write(true),
            FileMode::WriteAppend => options.append(true).create(true),
        };
        Ok(Self {
            file: options.open(path)?,
            textmode,
        })
    }

    /// Forward bytes to the native write primitive; failures degrade to
    /// a logged no-op.
    pub fn write(&mut self, buf: &[u8]) {
        if let Err(err) = self.file.write_all(buf) {
            warn!(%err, "file stream write failed");
        }
    }

    /// One byte from the native read primitive, or `None` at
    /// end-of-data or on failure.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.file.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(err) => {
                warn!(%err, "file stream read failed");
                None
            }
        }
    }

    /// Delegate to the native seek.
    pub fn seek(&mut self, pos: i32, mode: SeekMode) {
        let target = match mode {
            SeekMode::Start => SeekFrom::Start(pos.max(0) as u64),
            SeekMode::Current => SeekFrom::Current(pos as i64),
            SeekMode::End => SeekFrom::End(pos as i64),
        };
        if let Err(err) = self.file.seek(target) {
            warn!(%err, "file stream seek failed");
        }
    }

    /// Delegate to the native tell.
    pub fn position(&mut self) -> u32 {
        match self.file.stream_position() {
            Ok(pos) => pos.min(u32::MAX as u64) as u32,
            Err(err) => {
                warn!(%err, "file stream tell failed");
                0
            }
        }
    }
}

/// Type-specific stream state.
#[derive(Debug)]
pub enum StreamKind {
    /// Memory stream; `None` is the inert no-buffer form on which every
    /// operation is a complete no-op.
    Memory(Option<MemoryBuf>),
    /// File stream over an owned native handle.
    File(FileStream),
    /// Output stream of one window, living and dying with it.
    Window(WindowId),
}

/// A live stream.
#[derive(Debug)]
pub struct Stream {
    /// Client-supplied tag, never interpreted.
    pub rock: u32,
    /// Whether reads are permitted (fixed at open).
    pub readable: bool,
    /// Whether writes are permitted (fixed at open).
    pub writable: bool,
    /// Units read so far.
    pub read_count: u32,
    /// Units written so far, counting truncated and rejected attempts.
    pub write_count: u32,
    /// Variant state.
    pub kind: StreamKind,
}

impl Stream {
    /// Memory stream over an optional caller-supplied buffer. An absent
    /// or empty buffer produces the inert form.
    #[must_use]
    pub fn memory(buf: Option<Vec<u8>>, mode: FileMode, rock: u32) -> Self {
        // Read-opened buffers are fully readable; writable buffers
        // expose nothing until written, so read-after-write sees
        // exactly the written data.
        let buf = buf.filter(|b| !b.is_empty()).map(|b| match mode {
            FileMode::Read => MemoryBuf::for_reading(b),
            _ => MemoryBuf::for_writing(b),
        });
        Self {
            rock,
            readable: mode != FileMode::Write,
            writable: mode != FileMode::Read,
            read_count: 0,
            write_count: 0,
            kind: StreamKind::Memory(buf),
        }
    }

    /// File stream over an already-opened native handle.
    #[must_use]
    pub fn file(file: FileStream, mode: FileMode, rock: u32) -> Self {
        Self {
            rock,
            readable: matches!(mode, FileMode::Read | FileMode::ReadWrite),
            writable: mode != FileMode::Read,
            read_count: 0,
            write_count: 0,
            kind: StreamKind::File(file),
        }
    }

    /// The write-only stream owned by a window.
    #[must_use]
    pub fn for_window(win: WindowId) -> Self {
        Self {
            rock: 0,
            readable: false,
            writable: true,
            read_count: 0,
            write_count: 0,
            kind: StreamKind::Window(win),
        }
    }

    /// Current counters, as reported at close time.
    #[must_use]
    pub fn result(&self) -> StreamResult {
        StreamResult {
            read_count: self.read_count,
            write_count: self.write_count,
            buffer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_truncates_at_capacity() {
        let mut buf = MemoryBuf::for_writing(vec![0; 8]);
        buf.write(b"HELLOWORLD");
        assert_eq!(buf.highwater(), 8);
        assert_eq!(buf.position(), 8);
        assert_eq!(buf.clone().into_data(), b"HELLOWOR");
    }

    #[test]
    fn read_stops_at_highwater_not_capacity() {
        let mut buf = MemoryBuf::for_writing(vec![0; 8]);
        buf.write(b"abc");
        buf.seek(0, SeekMode::Start);
        assert_eq!(buf.read_byte(), Some(b'a'));
        assert_eq!(buf.read_byte(), Some(b'b'));
        assert_eq!(buf.read_byte(), Some(b'c'));
        assert_eq!(buf.read_byte(), None);
    }

    #[test]
    fn read_opened_buffer_is_fully_readable() {
        let mut buf = MemoryBuf::for_reading(b"xyz".to_vec());
        assert_eq!(buf.highwater(), 3);
        assert_eq!(buf.read_byte(), Some(b'x'));
    }

    #[test]
    fn seek_clamps_into_valid_data() {
        let mut buf = MemoryBuf::for_reading(b"abcdef".to_vec());
        buf.seek(100, SeekMode::Start);
        assert_eq!(buf.position(), 6);
        buf.seek(-100, SeekMode::Current);
        assert_eq!(buf.position(), 0);
        buf.seek(-2, SeekMode::End);
        assert_eq!(buf.position(), 4);
    }

    #[test]
    fn write_past_highwater_extends_it() {
        let mut buf = MemoryBuf::for_writing(vec![0; 10]);
        buf.write(b"1234");
        buf.seek(2, SeekMode::Start);
        buf.write(b"ab");
        assert_eq!(buf.highwater(), 4);
        buf.write(b"cd");
        assert_eq!(buf.highwater(), 6);
    }

    #[test]
    fn memory_stream_modes_set_flags() {
        let read = Stream::memory(Some(b"x".to_vec()), FileMode::Read, 0);
        assert!(read.readable && !read.writable);
        let write = Stream::memory(Some(vec![0; 4]), FileMode::Write, 0);
        assert!(!write.readable && write.writable);
        let both = Stream::memory(Some(b"x".to_vec()), FileMode::ReadWrite, 0);
        assert!(both.readable && both.writable);
    }

    #[test]
    fn empty_buffer_is_inert() {
        let stream = Stream::memory(Some(Vec::new()), FileMode::Write, 0);
        assert!(matches!(stream.kind, StreamKind::Memory(None)));
    }
}
