// MXV Demux
// Copyright (c) 2026 The MXV Demux Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared primitives for the MXV demuxer.
//!
//! `mxv-core` provides the pieces that are independent of the MXRIFF64 container layout: the
//! common error type, the [`MediaSource`](io::MediaSource) byte-source abstraction, and the
//! composable byte-level readers built on top of it.

pub mod errors;
pub mod io;
