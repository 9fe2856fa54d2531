// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `chunks` module implements the MXRIFF64 container layer.
//!
//! An MXV file is a tree of chunks. Two chunk families coexist in the same file: 64-bit chunks
//! (8-byte identifier, 8-byte length) make up the bulk of the container, while the frame lookup
//! table is stored as 32-bit chunks (4-byte identifier, 4-byte length) inside an `MXLIST32`
//! container. Container chunks additionally carry an 8-byte form/content type and hold a
//! concatenation of sub-chunks as their payload.
//!
//! Chunks are parsed lazily: reading a chunk consumes only its headers and, for the fixed-layout
//! chunk types, the typed payload. Bulk payloads (JPEG images, PCM data) are read on demand
//! through a bounded [`ScopedStream`](mxv_core::io::ScopedStream) obtained from the chunk.

use std::fmt;
use std::marker::PhantomData;

use mxv_core::errors::{decode_error, Result};
use mxv_core::io::{MediaSourceStream, ReadBytes, SeekFrom};

mod chunk32;
mod chunk64;

pub use chunk32::{
    read_chunk32, AudioEntryChunk, AudioTableEntry, Chunk32, RawChunk32, VideoEntryChunk,
    VideoTableEntry, CHUNK32_HEADER_LEN,
};
pub use chunk64::{
    read_chunk64, AudioFrameChunk, Chunk64, ContainerChunk, FrameTableChunk, RawChunk64,
    VideoFlags, VideoFrameChunk, VideoHeaderChunk, VideoHeaderData, VideoHeaderV2Chunk,
    WaveFormatChunk, CHUNK64_HEADER_LEN, CONTAINER_TYPE_LEN, CONTENT_TYPE_FRAME_LIST,
    CONTENT_TYPE_LOOKUP_TABLE, FORM_TYPE_MXV_VIDEO,
};

/// A 4-byte chunk identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId32([u8; 4]);

impl ChunkId32 {
    /// Constructs a new identifier from the given byte array.
    pub const fn new(val: [u8; 4]) -> Self {
        ChunkId32(val)
    }

    /// Returns the raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub(crate) fn read(reader: &mut MediaSourceStream) -> Result<ChunkId32> {
        Ok(ChunkId32(reader.read_quad_bytes()?))
    }
}

impl fmt::Debug for ChunkId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(name) => f.write_str(name),
            _ => write!(f, "{:x?}", self.0),
        }
    }
}

impl fmt::Display for ChunkId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An 8-byte chunk identifier.
///
/// Form and content types of container chunks share this representation.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId64([u8; 8]);

impl ChunkId64 {
    /// Constructs a new identifier from the given byte array.
    pub const fn new(val: [u8; 8]) -> Self {
        ChunkId64(val)
    }

    /// Returns the raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub(crate) fn read(reader: &mut MediaSourceStream) -> Result<ChunkId64> {
        let mut val = [0u8; 8];
        reader.read_buf_exact(&mut val)?;
        Ok(ChunkId64(val))
    }
}

impl fmt::Debug for ChunkId64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(name) => f.write_str(name),
            _ => write!(f, "{:x?}", self.0),
        }
    }
}

impl fmt::Display for ChunkId64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Common capability of the chunks of one family: parsing from a stream and reporting the total
/// chunk length, headers included. [`ChunkIter`] is generic over this trait to walk a container
/// of either family.
pub trait ReadChunk: Sized {
    /// The size in bytes of this family's bare chunk header (identifier plus length field).
    const HEADER_LEN: u64;

    /// Reads one chunk from the stream. The stream must be positioned at the start of the chunk
    /// header.
    fn read(reader: &mut MediaSourceStream) -> Result<Self>;

    /// Returns the total length of the chunk including all headers.
    fn total_len(&self) -> u64;
}

/// `ChunkIter` lazily yields the sub-chunks of a container chunk while enforcing the parent's
/// byte budget.
///
/// Iteration terminates when the cursor reaches the end of the parent's data region exactly. A
/// positive residual smaller than a bare chunk header, or a child that extends beyond the parent,
/// is a format error.
pub struct ChunkIter<'a, C: ReadChunk> {
    reader: &'a mut MediaSourceStream,
    next_pos: u64,
    end_pos: u64,
    phantom: PhantomData<C>,
}

impl<'a, C: ReadChunk> ChunkIter<'a, C> {
    pub(crate) fn new(reader: &'a mut MediaSourceStream, data_pos: u64, data_len: u64) -> Self {
        ChunkIter { reader, next_pos: data_pos, end_pos: data_pos + data_len, phantom: PhantomData }
    }

    /// Returns a mutable reference to the underlying stream.
    ///
    /// This allows nested containers to be descended into mid-iteration; the iterator reseeks to
    /// the next child on the following call to [`next`](ChunkIter::next).
    pub fn inner_mut(&mut self) -> &mut MediaSourceStream {
        &mut *self.reader
    }

    /// Advances to and returns the next sub-chunk, or `None` once the parent's data region is
    /// exhausted.
    pub fn next(&mut self) -> Result<Option<C>> {
        if self.next_pos == self.end_pos {
            return Ok(None);
        }

        if self.end_pos - self.next_pos < C::HEADER_LEN {
            return decode_error("mxv: container residual is smaller than a chunk header");
        }

        self.reader.seek(SeekFrom::Start(self.next_pos))?;

        let chunk = C::read(self.reader)?;

        // Warning: the child's length is untrusted input. Compare it against the remaining budget
        // rather than adding it to a position, which may overflow.
        if self.end_pos - self.next_pos < chunk.total_len() {
            return decode_error("mxv: sub-chunk extends beyond its parent chunk");
        }

        self.next_pos += chunk.total_len();

        Ok(Some(chunk))
    }
}
