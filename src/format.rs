// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Backend-independent description of a decoder format.

use std::fmt;
use std::fmt::Display;

use crate::error::*;

/// MIME type of H.264 elementary streams.
pub const MIME_AVC: &str = "video/avc";

/// `COLOR_FormatYUV420Flexible`, the colour format requested from decoders.
pub const COLOR_FORMAT_YUV420_FLEXIBLE: i32 = 0x7f42_0888;

/// Keys used by the platform format dictionary.
pub mod keys {
    pub const MIME: &str = "mime";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const COLOR_FORMAT: &str = "color-format";
    pub const STRIDE: &str = "stride";
    pub const SLICE_HEIGHT: &str = "slice-height";
}

/// A decoder format: the codec, its dimensions and its pixel layout.
///
/// Every entry is optional since formats reported by decoders may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatDescription {
    pub mime: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub color_format: Option<i32>,
    pub stride: Option<i32>,
    pub slice_height: Option<i32>,
}

/// Builds the format used to configure a decoder for `mime` at `width`x`height`.
pub fn build_format(mime: &str, width: u32, height: u32, color_format: i32) -> FormatDescription {
    FormatDescription {
        mime: Some(mime.to_owned()),
        width: i32::try_from(width).ok(),
        height: i32::try_from(height).ok(),
        color_format: Some(color_format),
        ..Default::default()
    }
}

impl FormatDescription {
    /// Returns the width and height of this format.
    ///
    /// Fails if either is missing or not positive.
    pub fn geometry(&self) -> Result<(u32, u32)> {
        fn dimension(value: Option<i32>, key: &'static str) -> Result<u32> {
            value
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .ok_or(Error::InvalidFormat(key))
        }

        Ok((
            dimension(self.width, keys::WIDTH)?,
            dimension(self.height, keys::HEIGHT)?,
        ))
    }

    /// Iterates over the integer entries that are set, in dictionary order.
    pub fn int_entries(&self) -> impl Iterator<Item = (&'static str, i32)> {
        [
            (keys::WIDTH, self.width),
            (keys::HEIGHT, self.height),
            (keys::COLOR_FORMAT, self.color_format),
            (keys::STRIDE, self.stride),
            (keys::SLICE_HEIGHT, self.slice_height),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// Renders the format like the platform does, e.g.
/// `mime: string(video/avc), width: int32(320), height: int32(240)`.
impl Display for FormatDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(mime) = &self.mime {
            write!(f, "{}: string({})", keys::MIME, mime)?;
            sep = ", ";
        }
        for (key, value) in self.int_entries() {
            write!(f, "{}{}: int32({})", sep, key, value)?;
            sep = ", ";
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_format_sets_requested_entries() {
        let format = build_format(MIME_AVC, 1920, 1088, COLOR_FORMAT_YUV420_FLEXIBLE);
        assert_eq!(format.mime.as_deref(), Some("video/avc"));
        assert_eq!(format.geometry().unwrap(), (1920, 1088));
        assert_eq!(format.color_format, Some(0x7f420888));
        assert_eq!(format.stride, None);
    }

    #[test]
    fn display_matches_platform_rendering() {
        let format = build_format(MIME_AVC, 320, 240, COLOR_FORMAT_YUV420_FLEXIBLE);
        assert_eq!(
            format.to_string(),
            "mime: string(video/avc), width: int32(320), height: int32(240), \
             color-format: int32(2135033992)"
        );
        assert_eq!(FormatDescription::default().to_string(), "");
    }

    #[test]
    fn geometry_requires_both_dimensions() {
        let mut format = build_format(MIME_AVC, 640, 480, COLOR_FORMAT_YUV420_FLEXIBLE);
        format.height = None;
        assert!(matches!(
            format.geometry(),
            Err(Error::InvalidFormat(keys::HEIGHT))
        ));

        format.height = Some(480);
        format.width = Some(-1);
        assert!(matches!(
            format.geometry(),
            Err(Error::InvalidFormat(keys::WIDTH))
        ));
    }
}
