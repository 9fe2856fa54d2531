// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::debug;

use mxv_core::errors::{decode_error, Result};
use mxv_core::io::{BufReader, MediaSourceStream, ReadBytes, ScopedStream, SeekFrom};

use crate::info::ColorFormat;

use super::chunk32::Chunk32;
use super::{ChunkId64, ChunkIter, ReadChunk};

/// Size of a 64-bit chunk header: an 8-byte identifier followed by an 8-byte length.
pub const CHUNK64_HEADER_LEN: u64 = 16;

/// Size of the form/content type field carried by container chunks.
pub const CONTAINER_TYPE_LEN: u64 = 8;

/// The form type of the root envelope chunk.
pub const FORM_TYPE_MXV_VIDEO: ChunkId64 = ChunkId64::new(*b"MXJVID64");

/// Content type of the list that interleaves the video and audio frame chunks in decode order.
pub const CONTENT_TYPE_FRAME_LIST: ChunkId64 = ChunkId64::new(*b"MXJVFL64");

/// Content type of the list that holds the fixed-layout frame table entries.
pub const CONTENT_TYPE_LOOKUP_TABLE: ChunkId64 = ChunkId64::new(*b"MXJVTL32");

bitflags::bitflags! {
    /// Flag bits of the video header. Only one bit has a known meaning.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct VideoFlags: u32 {
        /// The container carries audio frames.
        const HAS_AUDIO = 0x04;
    }
}

/// A 64-bit chunk of the MXRIFF64 container.
#[derive(Clone, Debug)]
pub enum Chunk64 {
    /// The MXRIFF64 root envelope.
    Riff(ContainerChunk),
    /// An MXLIST64 container of 64-bit sub-chunks.
    List64(ContainerChunk),
    /// An MXLIST32 container of 32-bit sub-chunks.
    List32(ContainerChunk),
    /// The MXJVHD64 video header.
    VideoHeader(VideoHeaderChunk),
    /// The MXJVH264 video header, revision 2.
    VideoHeaderV2(VideoHeaderV2Chunk),
    /// The MXWFMT64 wave format description.
    WaveFormat(WaveFormatChunk),
    /// The MXJVFT64 legacy frame offset table.
    FrameTable(FrameTableChunk),
    /// An MXJVVF64 video frame carrying raw JPEG data.
    VideoFrame(VideoFrameChunk),
    /// An MXJVAF64 audio frame carrying raw PCM data.
    AudioFrame(AudioFrameChunk),
    /// A chunk with an unrecognized identifier.
    Unknown(RawChunk64),
}

impl Chunk64 {
    /// Returns the identifier of the chunk.
    pub fn id(&self) -> ChunkId64 {
        match self {
            Chunk64::Riff(c) | Chunk64::List64(c) | Chunk64::List32(c) => c.id,
            Chunk64::VideoHeader(_) => ChunkId64::new(*b"MXJVHD64"),
            Chunk64::VideoHeaderV2(_) => ChunkId64::new(*b"MXJVH264"),
            Chunk64::WaveFormat(_) => ChunkId64::new(*b"MXWFMT64"),
            Chunk64::FrameTable(_) => ChunkId64::new(*b"MXJVFT64"),
            Chunk64::VideoFrame(_) => ChunkId64::new(*b"MXJVVF64"),
            Chunk64::AudioFrame(_) => ChunkId64::new(*b"MXJVAF64"),
            Chunk64::Unknown(c) => c.id,
        }
    }

    /// Returns the total length of the chunk including all headers.
    pub fn total_len(&self) -> u64 {
        match self {
            Chunk64::Riff(c) | Chunk64::List64(c) | Chunk64::List32(c) => c.total_len(),
            Chunk64::VideoHeader(c) => CHUNK64_HEADER_LEN + c.data_len,
            Chunk64::VideoHeaderV2(c) => CHUNK64_HEADER_LEN + c.data_len,
            Chunk64::WaveFormat(_) => CHUNK64_HEADER_LEN + WaveFormatChunk::DATA_LEN,
            Chunk64::FrameTable(c) => CHUNK64_HEADER_LEN + c.data_len,
            Chunk64::VideoFrame(c) => CHUNK64_HEADER_LEN + c.data_len,
            Chunk64::AudioFrame(c) => CHUNK64_HEADER_LEN + c.data_len,
            Chunk64::Unknown(c) => CHUNK64_HEADER_LEN + c.data_len,
        }
    }
}

impl ReadChunk for Chunk64 {
    const HEADER_LEN: u64 = CHUNK64_HEADER_LEN;

    fn read(reader: &mut MediaSourceStream) -> Result<Chunk64> {
        read_chunk64(reader)
    }

    fn total_len(&self) -> u64 {
        Chunk64::total_len(self)
    }
}

/// Reads one 64-bit chunk from the stream.
///
/// Only the chunk headers and, for fixed-layout chunk types, the typed payload are consumed.
/// Chunks with an unrecognized identifier are returned as [`Chunk64::Unknown`], never as an
/// error, so containers written by newer versions of the format remain readable.
pub fn read_chunk64(reader: &mut MediaSourceStream) -> Result<Chunk64> {
    let id = ChunkId64::read(reader)?;
    let data_len = read_data_len64(reader)?;

    let chunk = match id.as_bytes() {
        b"MXRIFF64" => Chunk64::Riff(ContainerChunk::read(reader, id, data_len)?),
        b"MXLIST64" => Chunk64::List64(ContainerChunk::read(reader, id, data_len)?),
        b"MXLIST32" => Chunk64::List32(ContainerChunk::read(reader, id, data_len)?),
        b"MXJVHD64" => Chunk64::VideoHeader(VideoHeaderChunk::read(reader, data_len)?),
        b"MXJVH264" => Chunk64::VideoHeaderV2(VideoHeaderV2Chunk::read(reader, data_len)?),
        b"MXWFMT64" => Chunk64::WaveFormat(WaveFormatChunk::read(reader, data_len)?),
        b"MXJVFT64" => Chunk64::FrameTable(FrameTableChunk::read(reader, data_len)?),
        b"MXJVVF64" => Chunk64::VideoFrame(VideoFrameChunk::read(reader, data_len)?),
        b"MXJVAF64" => Chunk64::AudioFrame(AudioFrameChunk::read(reader, data_len)?),
        _ => Chunk64::Unknown(RawChunk64::read(reader, id, data_len)?),
    };

    Ok(chunk)
}

fn read_data_len64(reader: &mut MediaSourceStream) -> Result<u64> {
    let data_len = reader.read_i64()?;

    if data_len < 0 {
        return decode_error("mxv: negative chunk data length");
    }

    Ok(data_len as u64)
}

/// Reads a typed payload of up to `full_len` bytes into a zero-padded buffer.
///
/// Older files declare a shorter video header payload; the bytes that are present are parsed and
/// the missing trailing fields read as zero. A payload longer than the fully populated layout is
/// malformed.
fn read_padded_payload(
    reader: &mut MediaSourceStream,
    data_len: u64,
    full_len: usize,
    mismatch: &'static str,
) -> Result<Vec<u8>> {
    if data_len > full_len as u64 {
        return decode_error(mismatch);
    }

    let mut buf = vec![0u8; full_len];
    reader.read_buf_exact(&mut buf[..data_len as usize])?;

    if (data_len as usize) < full_len {
        debug!("video header payload truncated to {} of {} bytes", data_len, full_len);
    }

    Ok(buf)
}

/// A container chunk: the MXRIFF64 root envelope or an MXLIST64/MXLIST32 list.
///
/// The payload is a concatenation of sub-chunks, walked lazily through [`chunks64`] or
/// [`chunks32`] depending on the chunk family the container holds.
///
/// [`chunks64`]: ContainerChunk::chunks64
/// [`chunks32`]: ContainerChunk::chunks32
#[derive(Copy, Clone, Debug)]
pub struct ContainerChunk {
    /// The identifier of the container itself.
    pub id: ChunkId64,
    /// The tag describing the container's contents: the form type of the root chunk, or the
    /// content type of a list chunk.
    pub content_type: ChunkId64,
    pub(crate) data_len: u64,
    pub(crate) data_pos: u64,
}

impl ContainerChunk {
    fn read(reader: &mut MediaSourceStream, id: ChunkId64, data_len: u64) -> Result<ContainerChunk> {
        let content_type = ChunkId64::read(reader)?;
        let data_pos = reader.pos();

        Ok(ContainerChunk { id, content_type, data_len, data_pos })
    }

    /// Returns the length of the container's data region, the content type field excluded.
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Returns the total length of the chunk including all headers.
    pub fn total_len(&self) -> u64 {
        CHUNK64_HEADER_LEN + CONTAINER_TYPE_LEN + self.data_len
    }

    /// Returns an iterator over the container's 64-bit sub-chunks.
    pub fn chunks64<'a>(&self, reader: &'a mut MediaSourceStream) -> ChunkIter<'a, Chunk64> {
        ChunkIter::new(reader, self.data_pos, self.data_len)
    }

    /// Returns an iterator over the container's 32-bit sub-chunks.
    pub fn chunks32<'a>(&self, reader: &'a mut MediaSourceStream) -> ChunkIter<'a, Chunk32> {
        ChunkIter::new(reader, self.data_pos, self.data_len)
    }
}

/// Fields shared by both video header revisions: the full MXJVHD64 payload, which MXJVH264
/// extends. When both chunks are present in a file these fields must agree bytewise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VideoHeaderData {
    /// Size of the fully populated header payload. Observed to always be 112.
    pub struct_size: u32,
    pub unknown1: u32,
    /// Absolute file offset of the legacy frame offset table (MXJVFT64).
    pub frame_table_offset: u64,
    /// Total number of video frames. Several table entries may point at the same frame chunk.
    pub video_frames: u64,
    /// Reading this many bytes from a table offset yields at least one full frame chunk.
    pub max_read_size: u32,
    pub unknown2: u32,
    pub unknown3: u64,
    /// Full frames per second. Interlaced video stores full frames, not fields.
    pub framerate: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Identical to `frame_width` in all observed files.
    pub frame_width2: u32,
    /// Identical to `frame_height` in all observed files.
    pub frame_height2: u32,
    pub flags: VideoFlags,
    /// JPEG data size of the largest video frame chunk.
    pub max_jpeg_size: u32,
}

impl VideoHeaderData {
    /// Size of the fully populated payload in bytes.
    pub(crate) const LEN: usize = 72;

    fn read<B: ReadBytes>(reader: &mut B) -> Result<VideoHeaderData> {
        Ok(VideoHeaderData {
            struct_size: reader.read_u32()?,
            unknown1: reader.read_u32()?,
            frame_table_offset: reader.read_u64()?,
            video_frames: reader.read_u64()?,
            max_read_size: reader.read_u32()?,
            unknown2: reader.read_u32()?,
            unknown3: reader.read_u64()?,
            framerate: reader.read_f64()?,
            frame_width: reader.read_u32()?,
            frame_height: reader.read_u32()?,
            frame_width2: reader.read_u32()?,
            frame_height2: reader.read_u32()?,
            flags: VideoFlags::from_bits_retain(reader.read_u32()?),
            max_jpeg_size: reader.read_u32()?,
        })
    }
}

/// The MXJVHD64 video header.
#[derive(Copy, Clone, Debug)]
pub struct VideoHeaderChunk {
    pub(crate) data_len: u64,
    pub data: VideoHeaderData,
}

impl VideoHeaderChunk {
    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<VideoHeaderChunk> {
        let buf = read_padded_payload(
            reader,
            data_len,
            VideoHeaderData::LEN,
            "mxv: MXJVHD64 data length mismatch",
        )?;

        let data = VideoHeaderData::read(&mut BufReader::new(&buf))?;

        Ok(VideoHeaderChunk { data_len, data })
    }
}

/// The MXJVH264 video header, revision 2. Extends the MXJVHD64 payload with audio bookkeeping
/// and display information.
#[derive(Copy, Clone, Debug)]
pub struct VideoHeaderV2Chunk {
    pub(crate) data_len: u64,
    pub data: VideoHeaderData,
    /// Total number of audio frames.
    pub audio_frames: u64,
    /// Byte size of the largest audio frame chunk, headers included.
    pub max_audio_chunk_size: u64,
    /// Final image aspect ratio. Differs from the frame dimension ratio when the video does not
    /// have square pixels.
    pub aspect_ratio: f64,
    pub color_format: ColorFormat,
    pub unknown4: u32,
    /// Total number of audio samples.
    pub audio_samples: u64,
}

impl VideoHeaderV2Chunk {
    /// Size of the fully populated payload in bytes.
    const LEN: usize = 112;

    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<VideoHeaderV2Chunk> {
        let buf = read_padded_payload(
            reader,
            data_len,
            VideoHeaderV2Chunk::LEN,
            "mxv: MXJVH264 data length mismatch",
        )?;

        let mut payload = BufReader::new(&buf);

        let data = VideoHeaderData::read(&mut payload)?;

        Ok(VideoHeaderV2Chunk {
            data_len,
            data,
            audio_frames: payload.read_u64()?,
            max_audio_chunk_size: payload.read_u64()?,
            aspect_ratio: payload.read_f64()?,
            color_format: ColorFormat::new(payload.read_quad_bytes()?),
            unknown4: payload.read_u32()?,
            audio_samples: payload.read_u64()?,
        })
    }
}

/// The MXWFMT64 wave format description.
#[derive(Copy, Clone, Debug)]
pub struct WaveFormatChunk {
    /// Unclear meaning; possibly the number of audio tracks, possibly the sample format code.
    /// Only the value 1 has been observed.
    pub tracks: u16,
    /// The number of channels.
    pub channels: u16,
    /// Samples per second as declared by the writer. Unreliable, see the reader.
    pub sample_rate: u32,
    /// Bytes per second.
    pub byte_rate: u32,
    /// Bytes per sample over all channels.
    pub bytes_per_sample: u16,
    /// Bits per channel per sample.
    pub channel_bit_depth: u32,
}

impl WaveFormatChunk {
    /// Size of the payload in bytes.
    const DATA_LEN: u64 = 18;

    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<WaveFormatChunk> {
        if data_len != WaveFormatChunk::DATA_LEN {
            return decode_error("mxv: MXWFMT64 data length mismatch");
        }

        Ok(WaveFormatChunk {
            tracks: reader.read_u16()?,
            channels: reader.read_u16()?,
            sample_rate: reader.read_u32()?,
            byte_rate: reader.read_u32()?,
            bytes_per_sample: reader.read_u16()?,
            channel_bit_depth: reader.read_u32()?,
        })
    }
}

/// The MXJVFT64 legacy frame offset table: a packed sequence of absolute file offsets.
#[derive(Copy, Clone, Debug)]
pub struct FrameTableChunk {
    pub(crate) data_len: u64,
    data_pos: u64,
}

impl FrameTableChunk {
    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<FrameTableChunk> {
        if data_len % 8 != 0 {
            return decode_error("mxv: MXJVFT64 data length is not a multiple of 8");
        }

        Ok(FrameTableChunk { data_len, data_pos: reader.pos() })
    }

    /// Returns the number of offsets stored in the table.
    pub fn entry_count(&self) -> u64 {
        self.data_len / 8
    }

    /// Reads the packed file offsets.
    pub fn read_offsets(&self, reader: &mut MediaSourceStream) -> Result<Vec<u64>> {
        reader.seek(SeekFrom::Start(self.data_pos))?;

        let mut scoped = ScopedStream::new(reader, self.data_len);
        let mut offsets = Vec::new();

        for _ in 0..self.entry_count() {
            offsets.push(scoped.read_u64()?);
        }

        Ok(offsets)
    }
}

/// An MXJVVF64 video frame chunk. The payload is the raw JPEG image.
#[derive(Copy, Clone, Debug)]
pub struct VideoFrameChunk {
    pub(crate) data_len: u64,
    data_pos: u64,
}

impl VideoFrameChunk {
    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<VideoFrameChunk> {
        Ok(VideoFrameChunk { data_len, data_pos: reader.pos() })
    }

    /// Returns a bounded reader over the raw JPEG data.
    pub fn data_reader<'a>(
        &self,
        reader: &'a mut MediaSourceStream,
    ) -> Result<ScopedStream<&'a mut MediaSourceStream>> {
        reader.seek(SeekFrom::Start(self.data_pos))?;
        Ok(ScopedStream::new(reader, self.data_len))
    }
}

/// An MXJVAF64 audio frame chunk. A small typed header is followed by the raw PCM data.
#[derive(Copy, Clone, Debug)]
pub struct AudioFrameChunk {
    pub(crate) data_len: u64,
    pcm_pos: u64,
    /// Bits per channel per sample.
    pub channel_bit_depth: u32,
    /// Index of the first sample held by this frame.
    pub start_sample: u64,
    /// The number of samples held by this frame.
    pub samples: u32,
}

impl AudioFrameChunk {
    /// Size of the typed header preceding the PCM data.
    const TYPED_HEADER_LEN: u64 = 16;

    fn read(reader: &mut MediaSourceStream, data_len: u64) -> Result<AudioFrameChunk> {
        if data_len < AudioFrameChunk::TYPED_HEADER_LEN {
            return decode_error("mxv: MXJVAF64 chunk is too short");
        }

        let channel_bit_depth = reader.read_u32()?;
        let start_sample = reader.read_u64()?;
        let samples = reader.read_u32()?;

        Ok(AudioFrameChunk {
            data_len,
            pcm_pos: reader.pos(),
            channel_bit_depth,
            start_sample,
            samples,
        })
    }

    /// Returns the length of the raw PCM data in bytes.
    pub fn pcm_len(&self) -> u64 {
        self.data_len - AudioFrameChunk::TYPED_HEADER_LEN
    }

    /// Returns a bounded reader over the raw PCM data.
    pub fn data_reader<'a>(
        &self,
        reader: &'a mut MediaSourceStream,
    ) -> Result<ScopedStream<&'a mut MediaSourceStream>> {
        reader.seek(SeekFrom::Start(self.pcm_pos))?;
        Ok(ScopedStream::new(reader, self.pcm_len()))
    }
}

/// A placeholder for 64-bit chunks with an unrecognized identifier. It records the identifier and
/// length, and exposes the raw payload, so unknown chunks can be inspected or skipped.
#[derive(Copy, Clone, Debug)]
pub struct RawChunk64 {
    /// The identifier of the chunk.
    pub id: ChunkId64,
    pub(crate) data_len: u64,
    data_pos: u64,
}

impl RawChunk64 {
    fn read(reader: &mut MediaSourceStream, id: ChunkId64, data_len: u64) -> Result<RawChunk64> {
        Ok(RawChunk64 { id, data_len, data_pos: reader.pos() })
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

#[cfg(test)]
mod tests {
    use mxv_core::errors::Error;
    use mxv_core::io::{FiniteStream, ReadBytes};

    use crate::chunks::{read_chunk64, Chunk64};
    use crate::info::COLOR_FORMAT_YUY2;
    use crate::testutil::{chunk64, container64, mss_from, ByteWriter};

    use super::{VideoFlags, VideoHeaderData, VideoHeaderV2Chunk};

    fn video_header_payload() -> ByteWriter {
        let mut w = ByteWriter::new();
        w.u32(112); // struct size
        w.u32(0);
        w.u64(4096); // frame table offset
        w.u64(349); // video frames
        w.u32(65536); // max read size
        w.u32(0);
        w.u64(0);
        w.f64(25.0); // framerate
        w.u32(720); // width
        w.u32(576); // height
        w.u32(720);
        w.u32(576);
        w.u32(0x04); // flags
        w.u32(30000); // max jpeg size
        w
    }

    fn video_header_v2_payload() -> ByteWriter {
        let mut w = video_header_payload();
        w.u64(28); // audio frames
        w.u64(96032); // max audio chunk size
        w.f64(4.0 / 3.0); // aspect ratio
        w.bytes(b"YUY2");
        w.u32(0);
        w.u64(672000); // audio samples
        w
    }

    #[test]
    fn verify_parse_video_header_v2() {
        let data = chunk64(b"MXJVH264", &video_header_v2_payload().buf);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::VideoHeaderV2(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(chunk.data.struct_size, 112);
        assert_eq!(chunk.data.video_frames, 349);
        assert_eq!(chunk.data.framerate, 25.0);
        assert_eq!(chunk.data.frame_width, 720);
        assert_eq!(chunk.data.frame_height, 576);
        assert!(chunk.data.flags.contains(VideoFlags::HAS_AUDIO));
        assert_eq!(chunk.audio_frames, 28);
        assert_eq!(chunk.aspect_ratio, 4.0 / 3.0);
        assert_eq!(chunk.color_format, COLOR_FORMAT_YUY2);
        assert_eq!(chunk.audio_samples, 672000);
        assert_eq!(Chunk64::VideoHeaderV2(chunk).total_len(), 16 + 112);
    }

    #[test]
    fn verify_truncated_video_header_reads_zero() {
        // An older-variant MXJVH264 that only carries the base fields.
        let data = chunk64(b"MXJVH264", &video_header_payload().buf);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::VideoHeaderV2(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        // The base fields parse as usual, the extension fields read as zero.
        assert_eq!(chunk.data.video_frames, 349);
        assert_eq!(chunk.audio_frames, 0);
        assert_eq!(chunk.aspect_ratio, 0.0);
        assert_eq!(chunk.audio_samples, 0);
        assert_eq!(Chunk64::VideoHeaderV2(chunk).total_len(), 16 + 72);
    }

    #[test]
    fn verify_oversized_video_header_is_rejected() {
        let mut payload = video_header_v2_payload();
        payload.u64(0xdead);

        let data = chunk64(b"MXJVH264", &payload.buf);
        let mut mss = mss_from(data);

        match read_chunk64(&mut mss) {
            Err(Error::DecodeError(_)) => (),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_parse_wave_format() {
        let mut w = ByteWriter::new();
        w.u16(1); // tracks
        w.u16(2); // channels
        w.u32(47996); // declared sample rate
        w.u32(192000); // byte rate
        w.u16(4); // bytes per sample
        w.u32(16); // channel bit depth

        let data = chunk64(b"MXWFMT64", &w.buf);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::WaveFormat(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(chunk.tracks, 1);
        assert_eq!(chunk.channels, 2);
        assert_eq!(chunk.sample_rate, 47996);
        assert_eq!(chunk.byte_rate, 192000);
        assert_eq!(chunk.bytes_per_sample, 4);
        assert_eq!(chunk.channel_bit_depth, 16);
    }

    #[test]
    fn verify_wave_format_length_mismatch_is_rejected() {
        // The payload of MXWFMT64 is fixed at 18 bytes; declare 20.
        let data = chunk64(b"MXWFMT64", &[0u8; 20]);
        let mut mss = mss_from(data);

        match read_chunk64(&mut mss) {
            Err(Error::DecodeError(_)) => (),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_negative_chunk_length_is_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(b"MXJVVF64");
        data.extend_from_slice(&(-1i64).to_le_bytes());

        let mut mss = mss_from(data);

        match read_chunk64(&mut mss) {
            Err(Error::DecodeError(_)) => (),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_audio_frame_chunk() {
        let mut w = ByteWriter::new();
        w.u32(16); // channel bit depth
        w.u64(24000); // start sample
        w.u32(1000); // samples
        w.bytes(&[0xaa; 64]); // pcm

        let data = chunk64(b"MXJVAF64", &w.buf);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::AudioFrame(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(chunk.channel_bit_depth, 16);
        assert_eq!(chunk.start_sample, 24000);
        assert_eq!(chunk.samples, 1000);
        assert_eq!(chunk.pcm_len(), 64);

        let mut pcm = chunk.data_reader(&mut mss).unwrap();
        let bytes = pcm.read_boxed_slice_exact(pcm.bytes_available() as usize).unwrap();
        assert_eq!(&bytes[..], &[0xaa; 64]);
    }

    #[test]
    fn verify_short_audio_frame_chunk_is_rejected() {
        // Shorter than the 16-byte typed header.
        let data = chunk64(b"MXJVAF64", &[0u8; 8]);
        let mut mss = mss_from(data);

        match read_chunk64(&mut mss) {
            Err(Error::DecodeError(_)) => (),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_frame_table_chunk() {
        let mut w = ByteWriter::new();
        w.u64(100);
        w.u64(200);
        w.u64(300);

        let data = chunk64(b"MXJVFT64", &w.buf);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::FrameTable(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(chunk.entry_count(), 3);
        assert_eq!(chunk.read_offsets(&mut mss).unwrap(), vec![100, 200, 300]);
    }

    #[test]
    fn verify_ragged_frame_table_is_rejected() {
        let data = chunk64(b"MXJVFT64", &[0u8; 12]);
        let mut mss = mss_from(data);

        match read_chunk64(&mut mss) {
            Err(Error::DecodeError(_)) => (),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_unknown_chunk_exposes_raw_data() {
        let data = chunk64(b"MXJVCO64", &[0x42; 24]);
        let mut mss = mss_from(data);

        let chunk = match read_chunk64(&mut mss).unwrap() {
            Chunk64::Unknown(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(chunk.id.as_bytes(), b"MXJVCO64");

        let mut raw = chunk.data_reader(&mut mss).unwrap();
        assert_eq!(raw.byte_len(), 24);
        let bytes = raw.read_boxed_slice_exact(24).unwrap();
        assert_eq!(&bytes[..], &[0x42; 24]);
    }

    #[test]
    fn verify_empty_container_yields_no_children() {
        let data = container64(b"MXLIST64", b"MXJVFL64", &[]);
        let mut mss = mss_from(data);

        let container = match read_chunk64(&mut mss).unwrap() {
            Chunk64::List64(container) => container,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(container.data_len(), 0);
        assert!(container.chunks64(&mut mss).next().unwrap().is_none());
    }

    #[test]
    fn verify_child_lengths_sum_to_container_length() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&chunk64(b"MXJVVF64", &[1, 2, 3]));
        payload.extend_from_slice(&chunk64(b"MXJVCO64", &[0; 24]));
        payload.extend_from_slice(&chunk64(b"MXJVVF64", &[]));

        let data = container64(b"MXLIST64", b"MXJVFL64", &payload);
        let mut mss = mss_from(data);

        let container = match read_chunk64(&mut mss).unwrap() {
            Chunk64::List64(container) => container,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        let mut total = 0;
        let mut children = container.chunks64(&mut mss);
        while let Some(child) = children.next().unwrap() {
            total += child.total_len();
        }

        assert_eq!(total, container.data_len());
    }

    #[test]
    fn verify_child_overrunning_parent_is_rejected() {
        // A child declaring 64 bytes of data inside a container that only holds 24.
        let mut child = Vec::new();
        child.extend_from_slice(b"MXJVVF64");
        child.extend_from_slice(&64i64.to_le_bytes());
        child.extend_from_slice(&[0u8; 8]);

        let data = container64(b"MXLIST64", b"MXJVFL64", &child);
        let mut mss = mss_from(data);

        let container = match read_chunk64(&mut mss).unwrap() {
            Chunk64::List64(container) => container,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        match container.chunks64(&mut mss).next() {
            Err(Error::DecodeError(msg)) => assert!(msg.contains("beyond its parent")),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_container_residual_is_rejected() {
        // Eight stray bytes cannot hold a 16-byte chunk header.
        let data = container64(b"MXLIST64", b"MXJVFL64", &[0u8; 8]);
        let mut mss = mss_from(data);

        let container = match read_chunk64(&mut mss).unwrap() {
            Chunk64::List64(container) => container,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        match container.chunks64(&mut mss).next() {
            Err(Error::DecodeError(msg)) => assert!(msg.contains("residual")),
            result => panic!("unexpected result: {:?}", result.map(|_| ())),
        }
    }

    #[test]
    fn verify_base_header_data_matches_v2_prefix() {
        let base = chunk64(b"MXJVHD64", &video_header_payload().buf);
        let v2 = chunk64(b"MXJVH264", &video_header_v2_payload().buf);

        let mut mss = mss_from(base);
        let base = match read_chunk64(&mut mss).unwrap() {
            Chunk64::VideoHeader(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        let mut mss = mss_from(v2);
        let v2 = match read_chunk64(&mut mss).unwrap() {
            Chunk64::VideoHeaderV2(chunk) => chunk,
            chunk => panic!("unexpected chunk {}", chunk.id()),
        };

        assert_eq!(base.data, v2.data);
    }

    #[test]
    fn verify_video_header_data_len() {
        // The parsed field layout must cover the full payload exactly.
        let buf = video_header_payload().buf;
        assert_eq!(buf.len(), VideoHeaderData::LEN);
        assert_eq!(video_header_v2_payload().buf.len(), VideoHeaderV2Chunk::LEN);
    }
}
