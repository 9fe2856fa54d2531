// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::io;
use std::result;

/// `SeekErrorKind` is a list of generic reasons why a seek may fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeekErrorKind {
    /// The source is not seekable at all.
    Unseekable,
    /// The source can only be seeked forward.
    ForwardOnly,
    /// The offset to seek to is out of range.
    OutOfRange,
}

impl SeekErrorKind {
    fn as_str(&self) -> &'static str {
        match *self {
            SeekErrorKind::Unseekable => "source is not seekable",
            SeekErrorKind::ForwardOnly => "source can only be seeked forward",
            SeekErrorKind::OutOfRange => "requested seek offset is out-of-range for source",
        }
    }
}

/// `Error` provides an enumeration of all possible errors reported by this library.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or seeking the source.
    IoError(io::Error),
    /// The source contained malformed data and could not be demuxed.
    DecodeError(&'static str),
    /// The source could not be seeked.
    SeekError(SeekErrorKind),
    /// An unsupported container feature was encountered.
    Unsupported(&'static str),
    /// Two redundant pieces of information in the container contradict each other.
    IntegrityError(&'static str),
    /// A chunk required by the container format is absent.
    MissingChunk(&'static str),
    /// A frame or sample index lies outside of the valid range.
    OutOfRange(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => err.fmt(f),
            Error::DecodeError(msg) => {
                write!(f, "malformed container: {}", msg)
            }
            Error::SeekError(ref kind) => {
                write!(f, "seek error: {}", kind.as_str())
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            Error::IntegrityError(msg) => {
                write!(f, "integrity check failed: {}", msg)
            }
            Error::MissingChunk(chunk) => {
                write!(f, "required chunk is missing: {}", chunk)
            }
            Error::OutOfRange(msg) => {
                write!(f, "out of range: {}", msg)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a decode error.
pub fn decode_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::DecodeError(msg))
}

/// Convenience function to create a seek error.
pub fn seek_error<T>(kind: SeekErrorKind) -> Result<T> {
    Err(Error::SeekError(kind))
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to create an integrity error.
pub fn integrity_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::IntegrityError(msg))
}

/// Convenience function to create a missing chunk error.
pub fn missing_chunk_error<T>(chunk: &'static str) -> Result<T> {
    Err(Error::MissingChunk(chunk))
}

/// Convenience function to create an out-of-range error.
pub fn out_of_range_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::OutOfRange(msg))
}

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(Error::IoError(io::Error::new(io::ErrorKind::UnexpectedEof, "end of stream")))
}
