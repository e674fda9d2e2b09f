// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! This module defines the interface a hardware decoder and its frame reader need to implement
//! in order to be driven by a `DecoderSession`.

use anyhow::Result;
use enumn::N;

use crate::format::FormatDescription;

pub mod fake;
#[cfg(target_os = "android")]
pub mod ndk;

/// Creates decoders and frame readers and reports what they can do.
pub trait DecoderBackend {
    /// Surface a decoder renders decoded frames into. Dropping it releases the reference.
    type Window;
    type Decoder: HardwareDecoder<Window = Self::Window>;
    type Reader: FrameReader<Window = Self::Window>;

    /// Create a decoder for the codec identified by `mime`.
    fn create_decoder(&mut self, mime: &str) -> Result<Self::Decoder>;

    /// Create a frame reader producing `width`x`height` YUV 4:2:0 images, holding at most
    /// `max_images` of them at a time.
    fn create_frame_reader(
        &mut self,
        width: u32,
        height: u32,
        max_images: u32,
    ) -> Result<Self::Reader>;

    /// Whether decoders can take new input parameters while running.
    fn supports_set_parameters(&self) -> bool;
}

/// A hardware decoder with an input buffer queue and an output buffer/event queue.
pub trait HardwareDecoder {
    type Window;

    /// Name of the component backing this decoder.
    fn name(&self) -> Result<String>;

    /// Configure the decoder with `format`, rendering decoded frames into `window`.
    fn configure(&mut self, format: &FormatDescription, window: &Self::Window) -> Result<()>;
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;

    /// Push a new input format to a running decoder.
    fn set_parameters(&mut self, format: &FormatDescription) -> Result<()>;

    /// Render decoded frames into `window` from now on.
    fn set_output_window(&mut self, window: &Self::Window) -> Result<()>;

    fn input_format(&self) -> Result<FormatDescription>;
    fn output_format(&self) -> Result<FormatDescription>;

    /// Returns the index of a free input buffer, or a negative value if none is available within
    /// `timeout_us`.
    fn dequeue_input_buffer(&mut self, timeout_us: i64) -> isize;

    /// Returns the writable memory of the dequeued input buffer `index`.
    fn input_buffer(&mut self, index: usize) -> Result<&mut [u8]>;

    /// Submit the first `size` bytes of input buffer `index`.
    fn queue_input_buffer(&mut self, index: usize, size: usize) -> Result<()>;

    /// Returns the raw output status: a buffer index, or one of the negative info codes that
    /// `OutputStatus::from_raw` understands.
    fn dequeue_output_buffer(&mut self, timeout_us: i64) -> isize;

    fn release_output_buffer(&mut self, index: usize, render: bool) -> Result<()>;
}

/// Receives the frames rendered into its window.
pub trait FrameReader {
    type Window;
    type Image: ReaderImage;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Returns a new reference to the window feeding this reader.
    fn window(&self) -> Result<Self::Window>;

    /// Acquire the oldest rendered image, or `None` if nothing was rendered yet.
    fn acquire_next_image(&mut self) -> Result<Option<Self::Image>>;
}

/// An image acquired from a `FrameReader`. Dropping it returns it to the reader.
pub trait ReaderImage {
    fn num_planes(&self) -> Result<usize>;
    fn plane(&self, index: usize) -> Result<Plane<'_>>;
}

/// One plane of a decoded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Distance in bytes between the starts of two consecutive rows.
    pub row_stride: u32,
    /// Distance in bytes between two consecutive samples of a row.
    pub pixel_stride: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, N)]
#[repr(isize)]
enum InfoCode {
    TryAgainLater = -1,
    OutputFormatChanged = -2,
    OutputBuffersChanged = -3,
}

/// Outcome of polling a decoder's output queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// Output buffer `index` holds a decoded frame.
    FrameReady(usize),
    /// The output format changed and must be read again.
    FormatChanged,
    /// Nothing is ready yet.
    TryAgainLater,
    /// Deprecated notification, ignored.
    BuffersChanged,
}

impl OutputStatus {
    /// Decodes a raw `dequeue_output_buffer` result. Returns `None` for unknown codes.
    pub fn from_raw(raw: isize) -> Option<Self> {
        if let Ok(index) = usize::try_from(raw) {
            return Some(OutputStatus::FrameReady(index));
        }
        InfoCode::n(raw).map(|code| match code {
            InfoCode::TryAgainLater => OutputStatus::TryAgainLater,
            InfoCode::OutputFormatChanged => OutputStatus::FormatChanged,
            InfoCode::OutputBuffersChanged => OutputStatus::BuffersChanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_status_from_raw() {
        assert_eq!(OutputStatus::from_raw(0), Some(OutputStatus::FrameReady(0)));
        assert_eq!(OutputStatus::from_raw(7), Some(OutputStatus::FrameReady(7)));
        assert_eq!(OutputStatus::from_raw(-1), Some(OutputStatus::TryAgainLater));
        assert_eq!(OutputStatus::from_raw(-2), Some(OutputStatus::FormatChanged));
        assert_eq!(OutputStatus::from_raw(-3), Some(OutputStatus::BuffersChanged));
        assert_eq!(OutputStatus::from_raw(-4), None);
        assert_eq!(OutputStatus::from_raw(-10000), None);
    }
}
