// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A demuxer for MXV, the proprietary container format of a consumer video-editing product.
//!
//! An MXV file interleaves motion-JPEG video frames with raw PCM audio inside a 64-bit
//! RIFF-style chunked envelope. [`MxvReader`] provides random access to the raw JPEG payload of
//! every video frame and the raw PCM payload of every audio frame, along with the container
//! metadata in [`Info`](info::Info).
//!
//! The format is only partially reverse-engineered. Unknown chunks are skipped gracefully, and a
//! couple of quirks of files written by older product versions are tolerated; everything else is
//! validated strictly, including the consistency of the frame lookup table with the declared
//! frame and sample counts.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! use mxv_core::errors::Result;
//! use mxv_core::io::MediaSourceStream;
//! use mxv_demux::MxvReader;
//!
//! fn dump(path: &str) -> Result<()> {
//!     let file = File::open(path)?;
//!
//!     let mss = MediaSourceStream::new(Box::new(file));
//!     let mut reader = MxvReader::try_new(mss)?;
//!
//!     println!(
//!         "{}x{} {} at {} fps, {} frames",
//!         reader.info().frame_width,
//!         reader.info().frame_height,
//!         reader.info().color_format,
//!         reader.info().framerate,
//!         reader.info().video_frames,
//!     );
//!
//!     for frame in 0..reader.info().video_frames as usize {
//!         let jpeg = reader.video_frame_data(frame)?;
//!         // Decode or store the image...
//!         # let _ = jpeg;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chunks;
pub mod info;

mod demuxer;

#[cfg(test)]
mod testutil;

pub use demuxer::MxvReader;
pub use info::Info;
