// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Errors that can happen in libmediandk.

use std::fmt;
use std::fmt::Display;

use remain::sorted;
use thiserror::Error as ThisError;

use crate::bindings;

/// A `media_status_t` value returned by libmediandk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStatus(pub i32);

impl MediaStatus {
    /// Converts `status` into a `Result`, attributing failures to `call`.
    pub(crate) fn check(call: &'static str, status: bindings::media_status_t) -> Result<()> {
        match status {
            bindings::AMEDIA_OK => Ok(()),
            status => Err(Error::MediaStatus {
                call,
                status: MediaStatus(status),
            }),
        }
    }

    /// Whether this status means the image reader has no image queued yet.
    pub fn is_no_buffer_available(&self) -> bool {
        self.0 == bindings::AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE
    }
}

impl Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use bindings::*;

        let name = match self.0 {
            AMEDIA_OK => "AMEDIA_OK",
            AMEDIACODEC_ERROR_INSUFFICIENT_RESOURCE => "AMEDIACODEC_ERROR_INSUFFICIENT_RESOURCE",
            AMEDIACODEC_ERROR_RECLAIMED => "AMEDIACODEC_ERROR_RECLAIMED",
            AMEDIA_ERROR_UNKNOWN => "AMEDIA_ERROR_UNKNOWN",
            AMEDIA_ERROR_MALFORMED => "AMEDIA_ERROR_MALFORMED",
            AMEDIA_ERROR_UNSUPPORTED => "AMEDIA_ERROR_UNSUPPORTED",
            AMEDIA_ERROR_INVALID_OBJECT => "AMEDIA_ERROR_INVALID_OBJECT",
            AMEDIA_ERROR_INVALID_PARAMETER => "AMEDIA_ERROR_INVALID_PARAMETER",
            AMEDIA_ERROR_INVALID_OPERATION => "AMEDIA_ERROR_INVALID_OPERATION",
            AMEDIA_ERROR_END_OF_STREAM => "AMEDIA_ERROR_END_OF_STREAM",
            AMEDIA_ERROR_IO => "AMEDIA_ERROR_IO",
            AMEDIA_ERROR_WOULD_BLOCK => "AMEDIA_ERROR_WOULD_BLOCK",
            AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE => "AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE",
            AMEDIA_IMGREADER_MAX_IMAGES_ACQUIRED => "AMEDIA_IMGREADER_MAX_IMAGES_ACQUIRED",
            AMEDIA_IMGREADER_CANNOT_LOCK_IMAGE => "AMEDIA_IMGREADER_CANNOT_LOCK_IMAGE",
            AMEDIA_IMGREADER_CANNOT_UNLOCK_IMAGE => "AMEDIA_IMGREADER_CANNOT_UNLOCK_IMAGE",
            AMEDIA_IMGREADER_IMAGE_NOT_LOCKED => "AMEDIA_IMGREADER_IMAGE_NOT_LOCKED",
            _ => return write!(f, "unknown media status {}", self.0),
        };
        write!(f, "{} ({})", name, self.0)
    }
}

#[sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("string passed to libmediandk contains a NUL byte: {0}")]
    InteriorNul(#[from] std::ffi::NulError),
    #[error("{call} failed: {status}")]
    MediaStatus {
        call: &'static str,
        status: MediaStatus,
    },
    #[error("{0} returned a null handle")]
    NullHandle(&'static str),
    #[error("value for {0} does not fit the NDK's integer type")]
    OutOfRange(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
