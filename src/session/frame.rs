// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::Context;

use crate::backend::DecoderBackend;
use crate::backend::FrameReader;
use crate::backend::Plane;
use crate::backend::ReaderImage;
use crate::error::*;

/// A frame reader together with the window a decoder renders into to feed it.
pub struct FrameReaderBinding<R: FrameReader> {
    // Declared before `reader` so the window reference is released before the reader is deleted.
    window: R::Window,
    reader: R,
}

impl<R: FrameReader> FrameReaderBinding<R> {
    pub(crate) fn new<B>(backend: &mut B, width: u32, height: u32, max_images: u32) -> Result<Self>
    where
        B: DecoderBackend<Reader = R>,
    {
        let reader = backend
            .create_frame_reader(width, height, max_images)
            .with_context(|| format!("while creating a {}x{} frame reader", width, height))?;
        let window = reader
            .window()
            .context("while getting the frame reader window")?;
        Ok(FrameReaderBinding { window, reader })
    }

    pub fn width(&self) -> u32 {
        self.reader.width()
    }

    pub fn height(&self) -> u32 {
        self.reader.height()
    }

    pub fn window(&self) -> &R::Window {
        &self.window
    }

    pub(crate) fn acquire_next_image(&mut self) -> Result<Option<InFlightImage<R::Image>>> {
        let image = self
            .reader
            .acquire_next_image()
            .context("while acquiring a decoded image")?;
        image
            .map(|image| InFlightImage::new(image, self.width(), self.height()))
            .transpose()
    }
}

/// The image currently lent to the caller. Dropping it returns it to its reader.
pub struct InFlightImage<I: ReaderImage> {
    image: I,
    width: u32,
    height: u32,
}

impl<I: ReaderImage> InFlightImage<I> {
    fn new(image: I, width: u32, height: u32) -> Result<Self> {
        let planes = image
            .num_planes()
            .context("while counting image planes")?;
        if planes < 3 {
            return Err(Error::MissingPlanes(planes));
        }
        Ok(InFlightImage {
            image,
            width,
            height,
        })
    }

    pub fn frame(&self) -> Result<Frame<'_>> {
        let mut planes = [Plane::default(); 3];
        for (index, plane) in planes.iter_mut().enumerate() {
            *plane = self
                .image
                .plane(index)
                .with_context(|| format!("while reading plane {}", index))?;
        }
        Ok(Frame {
            width: self.width,
            height: self.height,
            planes,
        })
    }
}

/// A decoded frame, borrowed from the session until the next decode or release.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    /// Y, U and V planes.
    pub planes: [Plane<'a>; 3],
}

impl<'a> Frame<'a> {
    pub fn row_strides(&self) -> [u32; 3] {
        self.planes.map(|p| p.row_stride)
    }

    pub fn pixel_strides(&self) -> [u32; 3] {
        self.planes.map(|p| p.pixel_stride)
    }

    pub fn data(&self) -> [&'a [u8]; 3] {
        self.planes.map(|p| p.data)
    }
}
