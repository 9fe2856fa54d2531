// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `info` module defines the public metadata record of an MXV file and the catalogs of known
//! color and audio format codes.

use std::fmt;

/// A 4-byte color format tag as stored in the video header.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ColorFormat([u8; 4]);

/// All-zero color format tag, seen in files without a recorded format.
pub const COLOR_FORMAT_ZERO: ColorFormat = ColorFormat([0, 0, 0, 0]);
/// Color format tag `3`, meaning unknown.
pub const COLOR_FORMAT_THREE: ColorFormat = ColorFormat([3, 0, 0, 0]);
/// Planar YUV 4:2:0.
pub const COLOR_FORMAT_I420: ColorFormat = ColorFormat(*b"I420");
/// Planar YUV 4:2:0, identical to I420.
pub const COLOR_FORMAT_IYUV: ColorFormat = ColorFormat(*b"IYUV");
/// Packed YUV 4:1:1.
pub const COLOR_FORMAT_Y411: ColorFormat = ColorFormat(*b"Y411");
/// Packed YUV 4:2:2.
pub const COLOR_FORMAT_Y422: ColorFormat = ColorFormat(*b"Y422");
/// Packed YUV 4:2:2, identical to YUY2.
pub const COLOR_FORMAT_YUNV: ColorFormat = ColorFormat(*b"YUNV");
/// Packed YUV 4:2:2.
pub const COLOR_FORMAT_YUY2: ColorFormat = ColorFormat(*b"YUY2");
/// Packed YUV 4:2:2, identical to YUY2.
pub const COLOR_FORMAT_YUYV: ColorFormat = ColorFormat(*b"YUYV");
/// Planar YUV 4:2:0 with swapped chroma planes.
pub const COLOR_FORMAT_YV12: ColorFormat = ColorFormat(*b"YV12");

impl ColorFormat {
    /// Constructs a new color format tag from the given byte array.
    pub const fn new(val: [u8; 4]) -> Self {
        ColorFormat(val)
    }

    /// Returns the raw bytes of the tag.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl Default for ColorFormat {
    fn default() -> Self {
        COLOR_FORMAT_ZERO
    }
}

impl fmt::Debug for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(name) if self.0.iter().all(|b| b.is_ascii_graphic()) => f.write_str(name),
            _ => write!(f, "{:x?}", self.0),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An audio format code as used by wave format descriptions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioFormat(pub u16);

/// Uncompressed PCM.
pub const AUDIO_FORMAT_PCM: AudioFormat = AudioFormat(1);
/// Microsoft ADPCM.
pub const AUDIO_FORMAT_MS_ADPCM: AudioFormat = AudioFormat(2);
/// IEEE floating point.
pub const AUDIO_FORMAT_IEEE_FLOAT: AudioFormat = AudioFormat(3);
/// IBM CVSD.
pub const AUDIO_FORMAT_IBM_CVSD: AudioFormat = AudioFormat(5);
/// A-law companded.
pub const AUDIO_FORMAT_ALAW: AudioFormat = AudioFormat(6);
/// µ-law companded.
pub const AUDIO_FORMAT_MULAW: AudioFormat = AudioFormat(7);

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            AUDIO_FORMAT_PCM => "PCM",
            AUDIO_FORMAT_MS_ADPCM => "MS ADPCM",
            AUDIO_FORMAT_IEEE_FLOAT => "IEEE Float",
            AUDIO_FORMAT_IBM_CVSD => "IBM CVSD",
            AUDIO_FORMAT_ALAW => "A-law",
            AUDIO_FORMAT_MULAW => "µ-law",
            _ => "unknown",
        };

        f.write_str(name)
    }
}

/// Information about the video and audio data of an MXV file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    pub color_format: ColorFormat,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Full frames per second.
    pub framerate: f64,
    /// Total number of video frames.
    pub video_frames: u64,
    /// Output aspect ratio. The decoded video must be stretched to this ratio for display.
    pub aspect_ratio: f64,

    pub has_audio: bool,
    pub audio_format: AudioFormat,
    pub audio_channels: u16,
    /// Samples per second, derived from the byte rate. The sample rate declared in the wave
    /// format chunk is not trustworthy.
    pub audio_sample_rate: u32,
    pub audio_byte_rate: u32,
    pub audio_bytes_per_sample: u16,
    pub audio_channel_bit_depth: u32,
    /// Total number of audio frames.
    pub audio_frames: u64,
    /// Total number of audio samples.
    pub audio_samples: u64,
}
