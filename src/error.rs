// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Errors that can happen while driving a decode session.

use std::time::Duration;

use remain::sorted;
use thiserror::Error as ThisError;

#[sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    /// The hardware decoder or frame reader reported a failure.
    #[error("backend failure: {0:#}")]
    BackendFailure(#[from] anyhow::Error),
    #[error("{width}x{height} is below the minimum decodable size {min_width}x{min_height}")]
    DimensionsTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("a decoded frame is still held; release it before receiving another")]
    FrameInFlight,
    #[error("invalid session configuration: {0}")]
    InvalidConfig(serde_json::Error),
    #[error("format has no valid {0}")]
    InvalidFormat(&'static str),
    #[error("decoded image has {0} planes, expected 3")]
    MissingPlanes(usize),
    #[error("decode session is not initialized")]
    NotInitialized,
    #[error("decoder made no progress for {0:?}")]
    Stalled(Duration),
    #[error("decoder returned unknown output status {0}")]
    UnknownOutputStatus(isize),
    #[error("encoding is not supported by this subsystem")]
    UnsupportedEncoder,
}

pub type Result<T> = std::result::Result<T, Error>;
