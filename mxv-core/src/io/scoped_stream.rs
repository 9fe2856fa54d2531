// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;

use crate::errors::{end_of_stream_error, Result};

use super::{FiniteStream, ReadBytes};

/// A `ScopedStream` restricts the number of bytes that may be read to a specified limit.
///
/// Exact reads that would cross the limit fail with an end-of-stream error, and [`read_buf`]
/// returns 0 once the limit is reached. In other words, the scope boundary behaves exactly like
/// the end of the stream.
///
/// [`read_buf`]: ReadBytes::read_buf
pub struct ScopedStream<B: ReadBytes> {
    inner: B,
    len: u64,
    read: u64,
}

impl<B: ReadBytes> ScopedStream<B> {
    /// Instantiates a new `ScopedStream` over the inner reader with a limit of `len` bytes.
    pub fn new(inner: B, len: u64) -> Self {
        ScopedStream { inner, len, read: 0 }
    }

    /// Returns an immutable reference to the inner reader.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Returns a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Ignores the remainder of the `ScopedStream`.
    pub fn ignore(&mut self) -> Result<()> {
        let remaining = self.len - self.read;
        self.read = self.len;
        self.inner.ignore_bytes(remaining)
    }

    /// Converts the `ScopedStream` into the inner reader.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: ReadBytes> FiniteStream for ScopedStream<B> {
    fn byte_len(&self) -> u64 {
        self.len
    }

    fn bytes_read(&self) -> u64 {
        self.read
    }

    fn bytes_available(&self) -> u64 {
        self.len - self.read
    }
}

impl<B: ReadBytes> ReadBytes for ScopedStream<B> {
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        if self.len - self.read < 1 {
            return end_of_stream_error();
        }

        self.read += 1;
        self.inner.read_byte()
    }

    #[inline(always)]
    fn read_double_bytes(&mut self) -> Result<[u8; 2]> {
        if self.len - self.read < 2 {
            return end_of_stream_error();
        }

        self.read += 2;
        self.inner.read_double_bytes()
    }

    #[inline(always)]
    fn read_quad_bytes(&mut self) -> Result<[u8; 4]> {
        if self.len - self.read < 4 {
            return end_of_stream_error();
        }

        self.read += 4;
        self.inner.read_quad_bytes()
    }

    fn read_buf(&mut self, buf: &mut [u8]) -> Result<usize> {
        // Limit the read to the remainder of the scope. At the boundary this requests a zero
        // length read which reports 0 bytes read, the end-of-stream convention of `read_buf`.
        let scoped_len = cmp::min(self.len - self.read, buf.len() as u64) as usize;

        if scoped_len == 0 {
            return Ok(0);
        }

        let read = self.inner.read_buf(&mut buf[..scoped_len])?;
        self.read += read as u64;

        Ok(read)
    }

    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.len - self.read < buf.len() as u64 {
            return end_of_stream_error();
        }

        self.read += buf.len() as u64;
        self.inner.read_buf_exact(buf)
    }

    fn ignore_bytes(&mut self, count: u64) -> Result<()> {
        if self.len - self.read < count {
            return end_of_stream_error();
        }

        self.read += count;
        self.inner.ignore_bytes(count)
    }

    fn pos(&self) -> u64 {
        self.inner.pos()
    }
}
