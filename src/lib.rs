// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! H.264 decoding through a platform hardware decoder.
//!
//! A [`DecoderSession`] drives a decoder provided by a [`backend::DecoderBackend`]: on Android the
//! `AMediaCodec`/`AImageReader` pair from `backend::ndk`, in tests the in-process
//! [`backend::fake`]. The [`subsystem`] module exposes a session through the entry points an H.264
//! codec layer expects.

pub mod backend;
mod config;
mod error;
mod format;
pub mod session;
pub mod subsystem;

pub use backend::Plane;
pub use config::*;
pub use error::*;
pub use format::*;
pub use session::DecoderSession;
pub use session::EncodedUnit;
pub use session::Frame;
pub use session::SessionStats;
