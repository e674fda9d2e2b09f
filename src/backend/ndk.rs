// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Backend running on Android's `AMediaCodec` and `AImageReader`.

use anyhow::Result;
use base::info;
use mediandk::device_api_level;
use mediandk::Image;
use mediandk::ImageReader;
use mediandk::MediaCodec;
use mediandk::MediaFormat;
use mediandk::NativeWindow;
use mediandk::IMAGE_FORMAT_YUV_420_888;

use super::DecoderBackend;
use super::FrameReader;
use super::HardwareDecoder;
use super::Plane;
use super::ReaderImage;
use crate::format::keys;
use crate::format::FormatDescription;

/// First API level where `AMediaCodec_setParameters` is available.
const SET_PARAMETERS_API_LEVEL: u32 = 26;

#[derive(Clone)]
pub struct NdkBackend {
    api_level: Option<u32>,
}

impl NdkBackend {
    pub fn new() -> Self {
        let api_level = device_api_level();
        match api_level {
            Some(level) => info!("device API level {}", level),
            None => info!("device API level unknown"),
        }
        NdkBackend { api_level }
    }
}

impl Default for NdkBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderBackend for NdkBackend {
    type Window = NativeWindow;
    type Decoder = MediaCodec;
    type Reader = ImageReader;

    fn create_decoder(&mut self, mime: &str) -> Result<MediaCodec> {
        Ok(MediaCodec::create_decoder_by_type(mime)?)
    }

    fn create_frame_reader(
        &mut self,
        width: u32,
        height: u32,
        max_images: u32,
    ) -> Result<ImageReader> {
        Ok(ImageReader::new(
            width,
            height,
            IMAGE_FORMAT_YUV_420_888,
            max_images,
        )?)
    }

    fn supports_set_parameters(&self) -> bool {
        self.api_level
            .map_or(false, |level| level >= SET_PARAMETERS_API_LEVEL)
    }
}

fn to_media_format(description: &FormatDescription) -> Result<MediaFormat> {
    let mut format = MediaFormat::new()?;
    if let Some(mime) = &description.mime {
        format.set_string(keys::MIME, mime)?;
    }
    for (key, value) in description.int_entries() {
        format.set_i32(key, value)?;
    }
    Ok(format)
}

fn from_media_format(format: &MediaFormat) -> FormatDescription {
    FormatDescription {
        mime: format.get_string(keys::MIME),
        width: format.get_i32(keys::WIDTH),
        height: format.get_i32(keys::HEIGHT),
        color_format: format.get_i32(keys::COLOR_FORMAT),
        stride: format.get_i32(keys::STRIDE),
        slice_height: format.get_i32(keys::SLICE_HEIGHT),
    }
}

impl HardwareDecoder for MediaCodec {
    type Window = NativeWindow;

    fn name(&self) -> Result<String> {
        Ok(MediaCodec::name(self)?)
    }

    fn configure(&mut self, format: &FormatDescription, window: &NativeWindow) -> Result<()> {
        let format = to_media_format(format)?;
        Ok(MediaCodec::configure(self, &format, Some(window))?)
    }

    fn start(&mut self) -> Result<()> {
        Ok(MediaCodec::start(self)?)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(MediaCodec::stop(self)?)
    }

    fn set_parameters(&mut self, format: &FormatDescription) -> Result<()> {
        let format = to_media_format(format)?;
        Ok(MediaCodec::set_parameters(self, &format)?)
    }

    fn set_output_window(&mut self, window: &NativeWindow) -> Result<()> {
        Ok(self.set_output_surface(window)?)
    }

    fn input_format(&self) -> Result<FormatDescription> {
        Ok(from_media_format(&MediaCodec::input_format(self)?))
    }

    fn output_format(&self) -> Result<FormatDescription> {
        Ok(from_media_format(&MediaCodec::output_format(self)?))
    }

    fn dequeue_input_buffer(&mut self, timeout_us: i64) -> isize {
        MediaCodec::dequeue_input_buffer(self, timeout_us)
    }

    fn input_buffer(&mut self, index: usize) -> Result<&mut [u8]> {
        Ok(MediaCodec::input_buffer(self, index)?)
    }

    fn queue_input_buffer(&mut self, index: usize, size: usize) -> Result<()> {
        Ok(MediaCodec::queue_input_buffer(self, index, size, 0, 0)?)
    }

    fn dequeue_output_buffer(&mut self, timeout_us: i64) -> isize {
        let (status, _info) = MediaCodec::dequeue_output_buffer(self, timeout_us);
        status
    }

    fn release_output_buffer(&mut self, index: usize, render: bool) -> Result<()> {
        Ok(MediaCodec::release_output_buffer(self, index, render)?)
    }
}

impl FrameReader for ImageReader {
    type Window = NativeWindow;
    type Image = Image;

    fn width(&self) -> u32 {
        ImageReader::width(self)
    }

    fn height(&self) -> u32 {
        ImageReader::height(self)
    }

    fn window(&self) -> Result<NativeWindow> {
        Ok(ImageReader::window(self)?)
    }

    fn acquire_next_image(&mut self) -> Result<Option<Image>> {
        Ok(ImageReader::acquire_next_image(self)?)
    }
}

impl ReaderImage for Image {
    fn num_planes(&self) -> Result<usize> {
        Ok(Image::num_planes(self)?)
    }

    fn plane(&self, index: usize) -> Result<Plane<'_>> {
        Ok(Plane {
            data: self.plane_data(index)?,
            row_stride: self.plane_row_stride(index)?,
            pixel_stride: self.plane_pixel_stride(index)?,
        })
    }
}
