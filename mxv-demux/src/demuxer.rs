// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::{debug, error, info};

use mxv_core::errors::{
    decode_error, integrity_error, missing_chunk_error, out_of_range_error, unsupported_error,
    Result,
};
use mxv_core::io::{MediaSourceStream, ScopedStream, SeekFrom};

use crate::chunks::{
    read_chunk64, AudioTableEntry, Chunk32, Chunk64, ContainerChunk, FrameTableChunk,
    VideoFlags, VideoHeaderData, VideoTableEntry, WaveFormatChunk, CONTENT_TYPE_FRAME_LIST,
    CONTENT_TYPE_LOOKUP_TABLE, FORM_TYPE_MXV_VIDEO,
};
use crate::info::{Info, AUDIO_FORMAT_PCM};

/// The frame lookup table, cached in memory. Costs 12 bytes per video frame and 24 bytes per
/// audio frame.
struct LookupTable {
    video: Vec<VideoTableEntry>,
    audio: Vec<AudioTableEntry>,
}

/// MXV (MXRIFF64) demuxer.
///
/// `MxvReader` opens the container, validates its headers, and serves random access to the raw
/// JPEG payload of video frames and the raw PCM payload of audio frames.
///
/// The reader owns a single stream cursor. Every frame access repositions that cursor, so a data
/// reader returned for one frame must be consumed (or abandoned) before requesting another.
pub struct MxvReader {
    reader: MediaSourceStream,
    wave_format: Option<WaveFormatChunk>,
    frame_table: Option<FrameTableChunk>,
    frame_list: Option<ContainerChunk>,
    lookup_list: Option<ContainerChunk>,
    lookup: Option<LookupTable>,
    info: Info,
}

impl MxvReader {
    /// Attempts to open an MXV container from the given stream.
    ///
    /// This parses the root envelope and its immediate children, cross-validates the video
    /// headers, and populates [`Info`]. The frame lookup table is built lazily on first frame
    /// access, or eagerly through [`prepare_lookup_table`](MxvReader::prepare_lookup_table).
    pub fn try_new(mut mss: MediaSourceStream) -> Result<MxvReader> {
        let root = match read_chunk64(&mut mss)? {
            Chunk64::Riff(root) => root,
            chunk => {
                error!("root chunk is {}, not MXRIFF64", chunk.id());
                return decode_error("mxv: missing MXRIFF64 root chunk");
            }
        };

        if root.content_type != FORM_TYPE_MXV_VIDEO {
            error!("riff form is {}, not MXJVID64", root.content_type);
            return decode_error("mxv: riff form is not MXJVID64");
        }

        let mut video_header = None;
        let mut video_header_v2 = None;
        let mut wave_format = None;
        let mut frame_table = None;
        let mut frame_list = None;
        let mut lookup_list = None;

        // Capture the keyed chunks of the envelope. Duplicates overwrite the prior reference.
        let mut children = root.chunks64(&mut mss);

        while let Some(chunk) = children.next()? {
            match chunk {
                Chunk64::VideoHeader(c) => video_header = Some(c),
                Chunk64::VideoHeaderV2(c) => video_header_v2 = Some(c),
                Chunk64::WaveFormat(c) => wave_format = Some(c),
                Chunk64::FrameTable(c) => frame_table = Some(c),
                Chunk64::List64(c) if c.content_type == CONTENT_TYPE_FRAME_LIST => {
                    frame_list = Some(c);
                }
                Chunk64::List32(c) if c.content_type == CONTENT_TYPE_LOOKUP_TABLE => {
                    lookup_list = Some(c);
                }
                chunk => {
                    info!("ignoring chunk: id={}, len={}", chunk.id(), chunk.total_len());
                }
            }
        }

        // Both header revisions describe the same video. If a file carries both, the shared
        // fields must agree bytewise.
        if let (Some(hd), Some(h2)) = (&video_header, &video_header_v2) {
            if hd.data != h2.data {
                log_video_header_diff(&hd.data, &h2.data);
                return integrity_error("mxv: video headers contain contradicting information");
            }
        }

        // Everything of interest lives in the revision 2 header. A file without one cannot be
        // demuxed; the revision 1 header lacks the audio bookkeeping.
        let header = match &video_header_v2 {
            Some(h2) => h2,
            None => return missing_chunk_error("mxv: MXJVH264 video header"),
        };

        let mut info = Info {
            color_format: header.color_format,
            frame_width: header.data.frame_width,
            frame_height: header.data.frame_height,
            framerate: header.data.framerate,
            video_frames: header.data.video_frames,
            aspect_ratio: header.aspect_ratio,
            has_audio: header.data.flags.contains(VideoFlags::HAS_AUDIO),
            audio_frames: header.audio_frames,
            audio_samples: header.audio_samples,
            ..Default::default()
        };

        if info.has_audio {
            let fmt = match &wave_format {
                Some(fmt) => fmt,
                None => return missing_chunk_error("mxv: MXWFMT64 wave format"),
            };

            if fmt.tracks != 1 {
                return unsupported_error("mxv: multi-track audio");
            }

            if fmt.bytes_per_sample == 0 {
                return decode_error("mxv: wave format bytes per sample is zero");
            }

            info.audio_format = AUDIO_FORMAT_PCM;
            info.audio_channels = fmt.channels;
            // The declared sample rate can differ slightly from the true rate, the byte rate is
            // trustworthy.
            info.audio_sample_rate = fmt.byte_rate / u32::from(fmt.bytes_per_sample);
            info.audio_byte_rate = fmt.byte_rate;
            info.audio_bytes_per_sample = fmt.bytes_per_sample;
            info.audio_channel_bit_depth = fmt.channel_bit_depth;
        }

        Ok(MxvReader {
            reader: mss,
            wave_format,
            frame_table,
            frame_list,
            lookup_list,
            lookup: None,
            info,
        })
    }

    /// Returns information about the video and audio data of the container.
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Returns the container holding the interleaved video and audio frame chunks, if present.
    pub fn frame_list(&self) -> Option<&ContainerChunk> {
        self.frame_list.as_ref()
    }

    /// Reads and caches the frame lookup table.
    ///
    /// The table is validated against the video header: the entry counts must match the declared
    /// frame counts, and the audio frames must tile the declared sample range without gaps or
    /// overlaps. This function is idempotent.
    pub fn prepare_lookup_table(&mut self) -> Result<()> {
        if self.lookup.is_some() {
            return Ok(());
        }

        let lookup_list = match &self.lookup_list {
            Some(list) => list,
            None => return missing_chunk_error("mxv: MXLIST32 frame lookup table"),
        };

        let mut video = Vec::new();
        let mut audio = Vec::new();

        let mut entries = lookup_list.chunks32(&mut self.reader);

        while let Some(chunk) = entries.next()? {
            match chunk {
                Chunk32::VideoEntry(c) => video.push(c.entry),
                Chunk32::AudioEntry(c) => audio.push(c.entry),
                Chunk32::Unknown(c) => debug!("ignoring chunk in lookup table: id={}", c.id),
            }
        }

        // The audio entries are most likely written in order, but that is not guaranteed. The
        // sort is stable, so overlapping entries with equal start samples survive to be rejected
        // below.
        audio.sort_by_key(|afte| afte.start_sample);

        if self.info.video_frames != video.len() as u64 {
            error!(
                "lookup table has {} video entries, the header promises {}",
                video.len(),
                self.info.video_frames
            );
            return integrity_error("mxv: video frame count differs from header");
        }

        if self.info.audio_frames != audio.len() as u64 {
            error!(
                "lookup table has {} audio entries, the header promises {}",
                audio.len(),
                self.info.audio_frames
            );
            return integrity_error("mxv: audio frame count differs from header");
        }

        // The audio frames must tile the sample range seamlessly.
        let mut next_sample = 0u64;

        for afte in &audio {
            if afte.start_sample != next_sample {
                error!(
                    "audio frame starts at sample {}, expected sample {}",
                    afte.start_sample, next_sample
                );
                return integrity_error("mxv: gap or overlap in the audio data");
            }
            next_sample += u64::from(afte.samples);
        }

        if next_sample != self.info.audio_samples {
            error!(
                "audio frames hold {} samples, the header promises {}",
                next_sample, self.info.audio_samples
            );
            return integrity_error("mxv: audio sample count differs from header");
        }

        self.lookup = Some(LookupTable { video, audio });

        Ok(())
    }

    fn lookup_table(&mut self) -> Result<&LookupTable> {
        self.prepare_lookup_table()?;
        // prepare_lookup_table always leaves the table in place on success.
        Ok(self.lookup.as_ref().unwrap())
    }

    /// Returns an iterator over all video frame table entries with their frame numbers.
    ///
    /// The frame data is read by passing a frame number to
    /// [`video_frame_data`](MxvReader::video_frame_data).
    pub fn video_frames(&mut self) -> Result<impl Iterator<Item = (usize, VideoTableEntry)> + '_> {
        Ok(self.lookup_table()?.video.iter().copied().enumerate())
    }

    /// Returns an iterator over all audio frame table entries with their frame numbers, ordered
    /// by start sample.
    ///
    /// The frame data is read by passing a frame number to
    /// [`audio_frame_data`](MxvReader::audio_frame_data).
    pub fn audio_frames(&mut self) -> Result<impl Iterator<Item = (usize, AudioTableEntry)> + '_> {
        Ok(self.lookup_table()?.audio.iter().copied().enumerate())
    }

    /// Returns a bounded reader over the raw JPEG data of the given video frame.
    ///
    /// The valid frame numbers are `0..info().video_frames`.
    pub fn video_frame_data(
        &mut self,
        frame: usize,
    ) -> Result<ScopedStream<&mut MediaSourceStream>> {
        let vfte = match self.lookup_table()?.video.get(frame).copied() {
            Some(vfte) => vfte,
            None => return out_of_range_error("mxv: video frame number"),
        };

        if vfte.frame_chunk_offset < 0 {
            return decode_error("mxv: negative video frame chunk offset");
        }

        self.reader.seek(SeekFrom::Start(vfte.frame_chunk_offset as u64))?;

        let chunk = read_chunk64(&mut self.reader)?;

        // A zero chunk size is an observed corruption in older files; skip the check in that
        // case.
        if vfte.frame_chunk_size != 0 && chunk.total_len() != u64::from(vfte.frame_chunk_size) {
            error!(
                "video frame chunk is {} bytes, its table entry promises {}",
                chunk.total_len(),
                vfte.frame_chunk_size
            );
            return decode_error("mxv: video frame chunk size differs from its table entry");
        }

        match chunk {
            Chunk64::VideoFrame(vf) => vf.data_reader(&mut self.reader),
            chunk => {
                error!("video frame table entry points at chunk {}", chunk.id());
                decode_error("mxv: table entry does not point at a video frame chunk")
            }
        }
    }

    /// Returns a bounded reader over the raw PCM data of the given audio frame, along with the
    /// start sample and sample count parsed from the frame chunk itself.
    ///
    /// The valid frame numbers are `0..info().audio_frames`.
    pub fn audio_frame_data(
        &mut self,
        frame: usize,
    ) -> Result<(ScopedStream<&mut MediaSourceStream>, u64, u32)> {
        // The meaning of the PCM data is defined by the wave format chunk. Audio frames in a
        // container without one are malformed.
        if self.wave_format.is_none() {
            return decode_error("mxv: audio frame access without a MXWFMT64 wave format");
        }

        let afte = match self.lookup_table()?.audio.get(frame).copied() {
            Some(afte) => afte,
            None => return out_of_range_error("mxv: audio frame number"),
        };

        if afte.frame_chunk_offset < 0 {
            return decode_error("mxv: negative audio frame chunk offset");
        }

        self.reader.seek(SeekFrom::Start(afte.frame_chunk_offset as u64))?;

        let chunk = read_chunk64(&mut self.reader)?;

        // As with video frames, a zero chunk size skips the check.
        if afte.frame_chunk_size != 0 && chunk.total_len() != u64::from(afte.frame_chunk_size) {
            error!(
                "audio frame chunk is {} bytes, its table entry promises {}",
                chunk.total_len(),
                afte.frame_chunk_size
            );
            return decode_error("mxv: audio frame chunk size differs from its table entry");
        }

        match chunk {
            Chunk64::AudioFrame(af) => {
                let start_sample = af.start_sample;
                let samples = af.samples;
                Ok((af.data_reader(&mut self.reader)?, start_sample, samples))
            }
            chunk => {
                error!("audio frame table entry points at chunk {}", chunk.id());
                decode_error("mxv: table entry does not point at an audio frame chunk")
            }
        }
    }

    /// Returns the frame number and sample count of the audio frame that contains the given
    /// sample.
    pub fn audio_frame_from_sample(&mut self, sample: u64) -> Result<(usize, u32)> {
        let table = self.lookup_table()?;

        for (frame, afte) in table.audio.iter().enumerate() {
            if sample >= afte.start_sample && sample < afte.start_sample + u64::from(afte.samples) {
                return Ok((frame, afte.samples));
            }
        }

        out_of_range_error("mxv: no audio frame contains the requested sample")
    }

    /// Reads the legacy frame offset table (MXJVFT64), if the container carries one.
    pub fn legacy_frame_offsets(&mut self) -> Result<Option<Vec<u64>>> {
        match &self.frame_table {
            Some(table) => Ok(Some(table.read_offsets(&mut self.reader)?)),
            None => Ok(None),
        }
    }

    /// Unwraps this `MxvReader`, returning the underlying stream.
    pub fn into_inner(self) -> MediaSourceStream {
        self.reader
    }
}

/// Logs every field on which the two video header revisions disagree.
fn log_video_header_diff(hd: &VideoHeaderData, h2: &VideoHeaderData) {
    macro_rules! diff {
        ($field:ident) => {
            if hd.$field != h2.$field {
                error!(
                    "video header field {} differs: MXJVHD64 has {:?}, MXJVH264 has {:?}",
                    stringify!($field),
                    hd.$field,
                    h2.$field
                );
            }
        };
    }

    diff!(struct_size);
    diff!(unknown1);
    diff!(frame_table_offset);
    diff!(video_frames);
    diff!(max_read_size);
    diff!(unknown2);
    diff!(unknown3);
    diff!(framerate);
    diff!(frame_width);
    diff!(frame_height);
    diff!(frame_width2);
    diff!(frame_height2);
    diff!(flags);
    diff!(max_jpeg_size);
}
