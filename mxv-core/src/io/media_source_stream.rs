// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;
use std::io;
use std::io::{Read, Seek};

use crate::errors::{end_of_stream_error, seek_error, Result, SeekErrorKind};

use super::{MediaSource, ReadBytes, SeekFrom};

/// A `MediaSourceStream` is the common reader type of the MXV demuxer. By using type erasure and
/// dynamic dispatch, `MediaSourceStream` wraps and hides the inner reader from the consumer,
/// allowing any [`MediaSource`] to be used in a generic way, selectable at runtime.
///
/// `MediaSourceStream` tracks the absolute position of the stream. After any successful read of
/// `n` bytes the position advances by exactly `n`, and after any successful seek the position
/// equals the new absolute offset.
///
/// For sources that cannot natively seek, forward seeks are emulated by reading and discarding
/// bytes. Backward and end-anchored seeks on such sources fail.
pub struct MediaSourceStream {
    /// The source reader.
    inner: Box<dyn MediaSource>,
    /// Absolute position of the stream.
    abs_pos: u64,
}

impl MediaSourceStream {
    pub fn new(source: Box<dyn MediaSource>) -> Self {
        MediaSourceStream { inner: source, abs_pos: 0 }
    }

    /// Returns if the underlying source is seekable.
    #[inline]
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// Returns the length in bytes of the underlying source, if available.
    #[inline]
    pub fn byte_len(&self) -> Option<u64> {
        self.inner.byte_len()
    }

    /// Seeks the stream to the given position.
    ///
    /// A seek whose target equals the current position is a no-op regardless of the capabilities
    /// of the underlying source. If the source supports native seeking the seek is delegated.
    /// Otherwise, a forward seek is emulated by reading and discarding bytes; a backward seek
    /// fails with [`SeekErrorKind::ForwardOnly`], and an end-anchored seek fails with
    /// [`SeekErrorKind::Unseekable`].
    pub fn seek(&mut self, from: SeekFrom) -> Result<u64> {
        // Ignore any seek to the current position.
        match from {
            SeekFrom::Start(target) if target == self.abs_pos => return Ok(self.abs_pos),
            SeekFrom::Current(0) => return Ok(self.abs_pos),
            _ => (),
        }

        if self.inner.is_seekable() {
            // The inner cursor and the stream position coincide, so all whence modes delegate
            // unchanged.
            let pos = self.inner.seek(from)?;
            self.abs_pos = pos;
            return Ok(pos);
        }

        // The source cannot seek natively. Emulate a forward seek by discarding bytes.
        let delta = match from {
            SeekFrom::Start(target) => {
                if target < self.abs_pos {
                    return seek_error(SeekErrorKind::ForwardOnly);
                }
                target - self.abs_pos
            }
            SeekFrom::Current(delta) => {
                if delta < 0 {
                    return seek_error(SeekErrorKind::ForwardOnly);
                }
                delta as u64
            }
            SeekFrom::End(_) => return seek_error(SeekErrorKind::Unseekable),
        };

        self.discard_bytes(delta)?;

        Ok(self.abs_pos)
    }

    /// Unwraps this `MediaSourceStream`, returning the underlying source.
    pub fn into_inner(self) -> Box<dyn MediaSource> {
        self.inner
    }

    /// Discards `count` bytes by reading them into a sink.
    ///
    /// The stream position is advanced by every byte actually consumed, even when the source ends
    /// before the full count is discarded.
    fn discard_bytes(&mut self, mut count: u64) -> Result<()> {
        let mut sink = [0u8; 4096];

        while count > 0 {
            let len = cmp::min(count, sink.len() as u64) as usize;

            match io::Read::read(self, &mut sink[..len]) {
                Ok(0) => return end_of_stream_error(),
                Ok(read) => count -= read as u64,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl io::Read for MediaSourceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.abs_pos += read as u64;
        Ok(read)
    }
}

impl ReadBytes for MediaSourceStream {
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_buf_exact(&mut byte)?;
        Ok(byte[0])
    }

    #[inline(always)]
    fn read_double_bytes(&mut self) -> Result<[u8; 2]> {
        let mut bytes = [0u8; 2];
        self.read_buf_exact(&mut bytes)?;
        Ok(bytes)
    }

    #[inline(always)]
    fn read_quad_bytes(&mut self) -> Result<[u8; 4]> {
        let mut bytes = [0u8; 4];
        self.read_buf_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_buf(&mut self, buf: &mut [u8]) -> Result<usize> {
        let read = io::Read::read(self, buf)?;

        // Unlike the io::Read trait, ReadBytes returns an end-of-stream error when no more data
        // can be read. If a non-zero read is requested, and 0 bytes are read, return an
        // end-of-stream error.
        if !buf.is_empty() && read == 0 {
            end_of_stream_error()
        }
        else {
            Ok(read)
        }
    }

    fn read_buf_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            match io::Read::read(self, buf) {
                Ok(0) => break,
                Ok(read) => buf = &mut buf[read..],
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) => return Err(err.into()),
            }
        }

        if !buf.is_empty() {
            end_of_stream_error()
        }
        else {
            Ok(())
        }
    }

    fn ignore_bytes(&mut self, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        // A native seek is cheaper than consuming the bytes.
        if self.inner.is_seekable() {
            match i64::try_from(count) {
                Ok(delta) => {
                    self.seek(SeekFrom::Current(delta))?;
                    return Ok(());
                }
                Err(_) => return seek_error(SeekErrorKind::OutOfRange),
            }
        }

        self.discard_bytes(count)
    }

    fn pos(&self) -> u64 {
        self.abs_pos
    }
}
