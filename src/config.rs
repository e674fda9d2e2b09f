// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::*;
use crate::format::COLOR_FORMAT_YUV420_FLEXIBLE;
use crate::format::MIME_AVC;

/// Smallest width hardware decoders reliably accept.
pub const DEFAULT_MIN_WIDTH: u32 = 320;
/// Smallest height hardware decoders reliably accept.
pub const DEFAULT_MIN_HEIGHT: u32 = 240;

/// How a running decoder is told about a new input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeStrategy {
    /// Update the running decoder in place. Needs API level 26.
    SetParameters,
    /// Stop, configure with the new format and start again.
    Reconfigure,
}

/// Per-session settings.
///
/// Deserializes from JSON with kebab-case keys; missing keys take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct SessionConfig {
    pub mime: String,
    pub min_width: u32,
    pub min_height: u32,
    /// Dimensions the decoder is configured with before the first unit arrives. Defaults to the
    /// minimum dimensions.
    pub initial_width: Option<u32>,
    pub initial_height: Option<u32>,
    pub color_format: i32,
    pub max_images: u32,
    pub image_poll_interval_us: u64,
    /// Timeout passed to the decoder's dequeue calls. Negative values block.
    pub dequeue_timeout_us: i64,
    /// Give up on a pump that made no progress for this long. Only effective with a finite
    /// `dequeue_timeout_us`.
    pub stall_timeout_ms: Option<u64>,
    /// Forces a resize strategy instead of picking one from the backend's capabilities.
    pub resize_strategy: Option<ResizeStrategy>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mime: MIME_AVC.to_owned(),
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            initial_width: None,
            initial_height: None,
            color_format: COLOR_FORMAT_YUV420_FLEXIBLE,
            max_images: 4,
            image_poll_interval_us: 1000,
            dequeue_timeout_us: -1,
            stall_timeout_ms: None,
            resize_strategy: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::InvalidConfig)
    }

    pub fn initial_dimensions(&self) -> (u32, u32) {
        (
            self.initial_width.unwrap_or(self.min_width),
            self.initial_height.unwrap_or(self.min_height),
        )
    }

    /// Checks `width`x`height` against the minimum decodable size.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if width < self.min_width || height < self.min_height {
            return Err(Error::DimensionsTooSmall {
                width,
                height,
                min_width: self.min_width,
                min_height: self.min_height,
            });
        }
        Ok(())
    }

    pub fn image_poll_interval(&self) -> Duration {
        Duration::from_micros(self.image_poll_interval_us)
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.mime, "video/avc");
        assert_eq!(config.initial_dimensions(), (320, 240));
        assert_eq!(config.color_format, 0x7f420888);
        assert_eq!(config.max_images, 4);
        assert_eq!(config.dequeue_timeout_us, -1);
        assert_eq!(config.stall_timeout(), None);
        assert_eq!(config.resize_strategy, None);
    }

    #[test]
    fn from_json_kebab_case() {
        let config = SessionConfig::from_json(
            r#"{
                "initial-width": 1920,
                "initial-height": 1088,
                "stall-timeout-ms": 500,
                "resize-strategy": "reconfigure"
            }"#,
        )
        .unwrap();
        assert_eq!(config.initial_dimensions(), (1920, 1088));
        assert_eq!(config.stall_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.resize_strategy, Some(ResizeStrategy::Reconfigure));
        assert_eq!(config.min_width, DEFAULT_MIN_WIDTH);
    }

    #[test]
    fn from_json_rejects_unknown_keys() {
        assert!(matches!(
            SessionConfig::from_json(r#"{"min-widht": 16}"#),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn check_dimensions_against_minimum() {
        let config = SessionConfig::default();
        assert!(config.check_dimensions(320, 240).is_ok());
        assert!(matches!(
            config.check_dimensions(319, 1080),
            Err(Error::DimensionsTooSmall { width: 319, .. })
        ));
        assert!(config.check_dimensions(1920, 16).is_err());
    }
}
