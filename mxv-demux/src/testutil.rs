// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Helpers for composing MXV byte streams in tests.

use std::io::Cursor;

use mxv_core::io::MediaSourceStream;

/// A little-endian byte buffer writer.
pub struct ByteWriter {
    pub buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    pub fn u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn f64(&mut self, val: f64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn bytes(&mut self, val: &[u8]) {
        self.buf.extend_from_slice(val);
    }
}

/// Assembles a 64-bit chunk: identifier, length, payload.
pub fn chunk64(id: &[u8; 8], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + payload.len());
    buf.extend_from_slice(id);
    buf.extend_from_slice(&(payload.len() as i64).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Assembles a 32-bit chunk: identifier, length, payload.
pub fn chunk32(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + payload.len());
    buf.extend_from_slice(id);
    buf.extend_from_slice(&(payload.len() as i32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Assembles a container chunk: identifier, length, form/content type, payload. The form type is
/// excluded from the declared length.
pub fn container64(id: &[u8; 8], content_type: &[u8; 8], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24 + payload.len());
    buf.extend_from_slice(id);
    buf.extend_from_slice(&(payload.len() as i64).to_le_bytes());
    buf.extend_from_slice(content_type);
    buf.extend_from_slice(payload);
    buf
}

/// Wraps a byte vector in a seekable `MediaSourceStream`.
pub fn mss_from(data: Vec<u8>) -> MediaSourceStream {
    MediaSourceStream::new(Box::new(Cursor::new(data)))
}

/// Builds complete MXV files in memory.
///
/// The layout mirrors the files produced by the original encoder: the video headers, the wave
/// format, the legacy offset table, the interleaved frame list, and finally the frame lookup
/// table. A handful of switches produce deliberately inconsistent files.
pub struct Fixture {
    pub color_format: [u8; 4],
    pub frame_width: u32,
    pub frame_height: u32,
    pub framerate: f64,
    pub aspect_ratio: f64,
    pub video_frames: u32,
    pub jpeg_len: u32,
    pub audio_frames: u32,
    pub samples_per_frame: u32,
    pub channels: u16,
    pub declared_sample_rate: u32,
    pub byte_rate: u32,
    pub bytes_per_sample: u16,
    pub channel_bit_depth: u32,
    pub tracks: u16,
    pub has_audio: bool,

    pub omit_video_header: bool,
    pub omit_video_header_v2: bool,
    pub disagreeing_headers: bool,
    pub declared_video_frames: Option<u64>,
    pub audio_gap: bool,
    pub zero_entry_sizes: bool,
    pub wrong_video_entry_size: bool,
    pub bad_form_type: bool,
    pub unknown_root_chunk: bool,
}

impl Fixture {
    /// A PAL SD parameter set: YUY2 720x576 at 25 fps, 349 video and 28 audio frames.
    pub fn pal_sd() -> Fixture {
        Fixture {
            color_format: *b"YUY2",
            frame_width: 720,
            frame_height: 576,
            framerate: 25.0,
            aspect_ratio: 1.3333332999999998,
            video_frames: 349,
            audio_frames: 28,
            samples_per_frame: 24000,
            ..Fixture::hd(25.0, 0, 0)
        }
    }

    /// An HD parameter set: YV12 1920x1080 with matching video and audio frame counts.
    pub fn hd(framerate: f64, frames: u32, samples_per_frame: u32) -> Fixture {
        Fixture {
            color_format: *b"YV12",
            frame_width: 1920,
            frame_height: 1080,
            framerate,
            aspect_ratio: 1.7777777777777777,
            video_frames: frames,
            jpeg_len: 64,
            audio_frames: frames,
            samples_per_frame,
            channels: 2,
            declared_sample_rate: 47996,
            byte_rate: 192000,
            bytes_per_sample: 4,
            channel_bit_depth: 16,
            tracks: 1,
            has_audio: true,

            omit_video_header: false,
            omit_video_header_v2: false,
            disagreeing_headers: false,
            declared_video_frames: None,
            audio_gap: false,
            zero_entry_sizes: false,
            wrong_video_entry_size: false,
            bad_form_type: false,
            unknown_root_chunk: false,
        }
    }

    /// Returns the JPEG payload written for the given video frame.
    pub fn jpeg_payload(&self, frame: usize) -> Vec<u8> {
        let mut payload = vec![frame as u8; self.jpeg_len as usize];
        payload[..2].copy_from_slice(&[0xff, 0xd8]);
        payload
    }

    /// Returns the PCM payload written for the given audio frame.
    pub fn pcm_payload(&self, frame: usize) -> Vec<u8> {
        let len = self.samples_per_frame as usize * self.bytes_per_sample as usize;
        vec![0x80 ^ frame as u8; len]
    }

    fn write_header_base(&self, w: &mut ByteWriter, ft_pos: u64, tamper: bool) {
        let declared = self.declared_video_frames.unwrap_or(u64::from(self.video_frames));
        let pcm = u64::from(self.samples_per_frame) * u64::from(self.bytes_per_sample);
        let max_read = 16 + u64::from(self.jpeg_len) + 32 + pcm;

        w.u32(112); // struct size
        w.u32(0);
        w.u64(ft_pos);
        w.u64(declared);
        w.u32(max_read as u32);
        w.u32(0);
        w.u64(0);
        w.f64(self.framerate);
        w.u32(self.frame_width + u32::from(tamper));
        w.u32(self.frame_height);
        w.u32(self.frame_width);
        w.u32(self.frame_height);
        w.u32(if self.has_audio { 0x04 } else { 0 });
        w.u32(self.jpeg_len);
    }

    pub fn build(&self) -> Vec<u8> {
        let vf = u64::from(self.video_frames);
        let af = u64::from(self.audio_frames);
        let jpeg = u64::from(self.jpeg_len);
        let pcm = u64::from(self.samples_per_frame) * u64::from(self.bytes_per_sample);

        let video_chunk_len = 16 + jpeg;
        let audio_chunk_len = 16 + 16 + pcm;

        // Total sizes of the envelope's children, in file order.
        let hd_len: u64 = if self.omit_video_header { 0 } else { 16 + 72 };
        let h2_len: u64 = if self.omit_video_header_v2 { 0 } else { 16 + 112 };
        let wfmt_len: u64 = if self.has_audio { 16 + 18 } else { 0 };
        let unknown_len: u64 = if self.unknown_root_chunk { 16 + 24 } else { 0 };
        let ft_len: u64 = 16 + 8 * vf;
        let frame_list_len: u64 = 24 + vf * video_chunk_len + af * audio_chunk_len;
        let lookup_len: u64 = 24 + vf * (8 + 12) + af * (8 + 24);

        let root_data_len =
            hd_len + h2_len + wfmt_len + unknown_len + ft_len + frame_list_len + lookup_len;

        let ft_pos = 24 + hd_len + h2_len + wfmt_len + unknown_len;
        let frame_list_pos = ft_pos + ft_len;

        // Absolute offsets of the frame chunks inside the interleaved frame list.
        let mut video_offsets = Vec::new();
        let mut audio_offsets = Vec::new();

        let rounds = self.video_frames.max(self.audio_frames);
        let mut pos = frame_list_pos + 24;

        for i in 0..rounds {
            if i < self.video_frames {
                video_offsets.push(pos);
                pos += video_chunk_len;
            }
            if i < self.audio_frames {
                audio_offsets.push(pos);
                pos += audio_chunk_len;
            }
        }

        let mut w = ByteWriter::new();

        // Root envelope.
        w.bytes(b"MXRIFF64");
        w.i64(root_data_len as i64);
        w.bytes(if self.bad_form_type { b"MXJVID99" } else { b"MXJVID64" });

        // Video headers.
        if !self.omit_video_header {
            w.bytes(b"MXJVHD64");
            w.i64(72);
            self.write_header_base(&mut w, ft_pos, self.disagreeing_headers);
        }
        if !self.omit_video_header_v2 {
            w.bytes(b"MXJVH264");
            w.i64(112);
            self.write_header_base(&mut w, ft_pos, false);
            w.u64(af);
            w.u64(audio_chunk_len);
            w.f64(self.aspect_ratio);
            w.bytes(&self.color_format);
            w.u32(0);
            w.u64(af * u64::from(self.samples_per_frame));
        }

        // Wave format.
        if self.has_audio {
            w.bytes(b"MXWFMT64");
            w.i64(18);
            w.u16(self.tracks);
            w.u16(self.channels);
            w.u32(self.declared_sample_rate);
            w.u32(self.byte_rate);
            w.u16(self.bytes_per_sample);
            w.u32(self.channel_bit_depth);
        }

        if self.unknown_root_chunk {
            w.bytes(b"MXJVCO64");
            w.i64(24);
            w.bytes(&[0u8; 24]);
        }

        // Legacy frame offset table.
        w.bytes(b"MXJVFT64");
        w.i64((8 * vf) as i64);
        for offset in &video_offsets {
            w.u64(*offset);
        }

        // Interleaved frame list.
        w.bytes(b"MXLIST64");
        w.i64((frame_list_len - 24) as i64);
        w.bytes(b"MXJVFL64");

        for i in 0..rounds {
            if i < self.video_frames {
                w.bytes(b"MXJVVF64");
                w.i64(jpeg as i64);
                w.bytes(&self.jpeg_payload(i as usize));
            }
            if i < self.audio_frames {
                w.bytes(b"MXJVAF64");
                w.i64((16 + pcm) as i64);
                w.u32(self.channel_bit_depth);
                w.u64(u64::from(i) * u64::from(self.samples_per_frame));
                w.u32(self.samples_per_frame);
                w.bytes(&self.pcm_payload(i as usize));
            }
        }

        // Frame lookup table.
        w.bytes(b"MXLIST32");
        w.i64((lookup_len - 24) as i64);
        w.bytes(b"MXJVTL32");

        for i in 0..rounds {
            if i < self.video_frames {
                let size = if self.zero_entry_sizes {
                    0
                }
                else if self.wrong_video_entry_size {
                    video_chunk_len as u32 + 1
                }
                else {
                    video_chunk_len as u32
                };

                w.bytes(b"VFTE");
                w.i32(12);
                w.i64(video_offsets[i as usize] as i64);
                w.u32(size);
            }
            if i < self.audio_frames {
                let size = if self.zero_entry_sizes { 0 } else { audio_chunk_len as u32 };

                let mut start_sample = u64::from(i) * u64::from(self.samples_per_frame);
                if self.audio_gap && i == 1 {
                    start_sample += 1;
                }

                w.bytes(b"AFTE");
                w.i32(24);
                w.i64(audio_offsets[i as usize] as i64);
                w.u32(size);
                w.u64(start_sample);
                w.u32(self.samples_per_frame);
            }
        }

        assert_eq!(w.buf.len() as u64, 24 + root_data_len);

        w.buf
    }
}
