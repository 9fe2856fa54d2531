// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use mxv_core::errors::{decode_error, Result};
use mxv_core::io::{MediaSourceStream, ReadBytes, ScopedStream, SeekFrom};

use super::{ChunkId32, ReadChunk};

/// Size of a 32-bit chunk header: a 4-byte identifier followed by a 4-byte length.
pub const CHUNK32_HEADER_LEN: u64 = 8;

/// A 32-bit chunk of the MXRIFF64 container. Only the frame lookup table uses this family.
#[derive(Copy, Clone, Debug)]
pub enum Chunk32 {
    /// A VFTE video frame table entry.
    VideoEntry(VideoEntryChunk),
    /// An AFTE audio frame table entry.
    AudioEntry(AudioEntryChunk),
    /// A chunk with an unrecognized identifier.
    Unknown(RawChunk32),
}

impl Chunk32 {
    /// Returns the identifier of the chunk.
    pub fn id(&self) -> ChunkId32 {
        match self {
            Chunk32::VideoEntry(_) => ChunkId32::new(*b"VFTE"),
            Chunk32::AudioEntry(_) => ChunkId32::new(*b"AFTE"),
            Chunk32::Unknown(c) => c.id,
        }
    }

    /// Returns the total length of the chunk including its header.
    pub fn total_len(&self) -> u64 {
        match self {
            Chunk32::VideoEntry(_) => CHUNK32_HEADER_LEN + VideoEntryChunk::DATA_LEN,
            Chunk32::AudioEntry(_) => CHUNK32_HEADER_LEN + AudioEntryChunk::DATA_LEN,
            Chunk32::Unknown(c) => CHUNK32_HEADER_LEN + c.data_len,
        }
    }
}

impl ReadChunk for Chunk32 {
    const HEADER_LEN: u64 = CHUNK32_HEADER_LEN;

    fn read(reader: &mut MediaSourceStream) -> Result<Chunk32> {
        read_chunk32(reader)
    }

    fn total_len(&self) -> u64 {
        Chunk32::total_len(self)
    }
}

/// Reads one 32-bit chunk from the stream.
///
/// As with the 64-bit family, an unrecognized identifier is returned as [`Chunk32::Unknown`]
/// rather than an error.
pub fn read_chunk32(reader: &mut MediaSourceStream) -> Result<Chunk32> {
    let id = ChunkId32::read(reader)?;
    let data_len = read_data_len32(reader)?;

    let chunk = match id.as_bytes() {
        b"VFTE" => Chunk32::VideoEntry(VideoEntryChunk::read(reader, data_len)?),
        b"AFTE" => Chunk32::AudioEntry(AudioEntryChunk::read(reader, data_len)?),
        _ => Chunk32::Unknown(RawChunk32::read(reader, id, data_len)?),
    };

    Ok(chunk)
}

fn read_data_len32(reader: &mut MediaSourceStream) -> Result<u64> {
    let data_len = reader.read_i32()?;

    if data_len < 0 {
        return decode_error("mxv: negative chunk data length");
    }

    Ok(data_len as u64)
}

/// A video frame table entry, pointing at the MXJVVF64 chunk that holds one video frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VideoTableEntry {
    /// Absolute file offset of the frame chunk.
    pub frame_chunk_offset: i64,
    /// Total size of the frame chunk in bytes, headers included. Zero in some older, corrupted
    /// files.
    pub frame_chunk_size: u32,
}

/// The VFTE chunk wrapping a [`VideoTableEntry`].
#[derive(Copy, Clone, Debug)]
pub struct VideoEntryChunk {
    pub entry: VideoTableEntry,
}

impl VideoEntryChunk {
    /// Size of the payload in bytes.
    const DATA_LEN: u64 = 12;

    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<VideoEntryChunk> {
        if data_len != VideoEntryChunk::DATA_LEN {
            return decode_error("mxv: VFTE data length mismatch");
        }

        Ok(VideoEntryChunk {
            entry: VideoTableEntry {
                frame_chunk_offset: reader.read_i64()?,
                frame_chunk_size: reader.read_u32()?,
            },
        })
    }
}

/// An audio frame table entry, pointing at the MXJVAF64 chunk that holds one audio frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AudioTableEntry {
    /// Absolute file offset of the frame chunk.
    pub frame_chunk_offset: i64,
    /// Total size of the frame chunk in bytes, headers included. Zero in some older, corrupted
    /// files.
    pub frame_chunk_size: u32,
    /// Index of the first sample held by the frame.
    pub start_sample: u64,
    /// The number of samples held by the frame.
    pub samples: u32,
}

/// The AFTE chunk wrapping an [`AudioTableEntry`].
#[derive(Copy, Clone, Debug)]
pub struct AudioEntryChunk {
    pub entry: AudioTableEntry,
}

impl AudioEntryChunk {
    /// Size of the payload in bytes.
    const DATA_LEN: u64 = 24;

    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<AudioEntryChunk> {
        if data_len != AudioEntryChunk::DATA_LEN {
            return decode_error("mxv: AFTE data length mismatch");
        }

        Ok(AudioEntryChunk {
            entry: AudioTableEntry {
                frame_chunk_offset: reader.read_i64()?,
                frame_chunk_size: reader.read_u32()?,
                start_sample: reader.read_u64()?,
                samples: reader.read_u32()?,
            },
        })
    }
}

/// A placeholder for 32-bit chunks with an unrecognized identifier.
#[derive(Copy, Clone, Debug)]
pub struct RawChunk32 {
    /// The identifier of the chunk.
    pub id: ChunkId32,
    pub(crate) data_len: u64,
    data_pos: u64,
}

impl RawChunk32 {
    fn read(reader: &mut MediaSourceStream, id: ChunkId32, data_len: u64) -> Result<RawChunk32> {
        Ok(RawChunk32 { id, data_len, data_pos: reader.pos() })
    }

    /// Returns a bounded reader over the raw chunk data.
    pub fn data_reader<'a>(
        &self,
        reader: &'a mut MediaSourceStream,
    ) -> Result<ScopedStream<&'a mut MediaSourceStream>> {
        reader.seek(SeekFrom::Start(self.data_pos))?;
        Ok(ScopedStream::new(reader, self.data_len))
    }
}
