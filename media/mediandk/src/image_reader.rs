// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Owning wrappers for `AImageReader`, the `AImage`s it hands out and the `ANativeWindow` a
//! decoder renders into.

use std::os::raw::c_int;
use std::ptr;
use std::ptr::NonNull;
use std::slice;

use crate::bindings;
use crate::error::*;

/// `AIMAGE_FORMAT_YUV_420_888`, the flexible 3-plane YUV layout hardware decoders render to.
pub const IMAGE_FORMAT_YUV_420_888: i32 = bindings::AIMAGE_FORMAT_YUV_420_888;

/// A counted reference to an `ANativeWindow`.
///
/// The reference is released on drop, so the window outlives neither the reader that produced it
/// nor any decoder it is attached to for longer than this handle exists.
pub struct NativeWindow {
    ptr: NonNull<bindings::ANativeWindow>,
}

impl NativeWindow {
    pub(crate) fn as_ptr(&self) -> *mut bindings::ANativeWindow {
        self.ptr.as_ptr()
    }
}

impl Clone for NativeWindow {
    fn clone(&self) -> Self {
        // Safe because the window is valid and we release the new reference on drop.
        unsafe { bindings::ANativeWindow_acquire(self.as_ptr()) };
        NativeWindow { ptr: self.ptr }
    }
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        // Safe because we hold one reference on the window, acquired when this handle was created.
        unsafe { bindings::ANativeWindow_release(self.as_ptr()) };
    }
}

/// An owned `AImageReader`.
pub struct ImageReader {
    ptr: NonNull<bindings::AImageReader>,
    width: i32,
    height: i32,
}

impl ImageReader {
    /// Creates a reader producing `format` images of `width`x`height`, holding at most
    /// `max_images` acquired images at a time.
    pub fn new(width: u32, height: u32, format: i32, max_images: u32) -> Result<Self> {
        let width = i32::try_from(width).map_err(|_| Error::OutOfRange("width"))?;
        let height = i32::try_from(height).map_err(|_| Error::OutOfRange("height"))?;
        let max_images = i32::try_from(max_images).map_err(|_| Error::OutOfRange("max_images"))?;

        let mut reader = ptr::null_mut();
        // Safe because `reader` is a valid place to write to and we check the status.
        let status =
            unsafe { bindings::AImageReader_new(width, height, format, max_images, &mut reader) };
        MediaStatus::check("AImageReader_new", status)?;

        NonNull::new(reader)
            .map(|ptr| ImageReader { ptr, width, height })
            .ok_or(Error::NullHandle("AImageReader_new"))
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Returns a new reference to the window decoders can render into to feed this reader.
    pub fn window(&self) -> Result<NativeWindow> {
        let mut window = ptr::null_mut();
        // Safe because the reader is valid and `window` is a valid place to write to.
        let status = unsafe { bindings::AImageReader_getWindow(self.ptr.as_ptr(), &mut window) };
        MediaStatus::check("AImageReader_getWindow", status)?;
        let ptr = NonNull::new(window).ok_or(Error::NullHandle("AImageReader_getWindow"))?;

        // The window is owned by the reader; take our own reference so the handle can be dropped
        // independently.
        // Safe because `ptr` is a valid window.
        unsafe { bindings::ANativeWindow_acquire(ptr.as_ptr()) };
        Ok(NativeWindow { ptr })
    }

    /// Acquires the next queued image.
    ///
    /// Returns `Ok(None)` if no image has been rendered into the reader yet.
    pub fn acquire_next_image(&mut self) -> Result<Option<Image>> {
        let mut image = ptr::null_mut();
        // Safe because the reader is valid and `image` is a valid place to write to.
        let status =
            unsafe { bindings::AImageReader_acquireNextImage(self.ptr.as_ptr(), &mut image) };
        match MediaStatus::check("AImageReader_acquireNextImage", status) {
            Ok(()) => NonNull::new(image)
                .map(|ptr| Some(Image { ptr }))
                .ok_or(Error::NullHandle("AImageReader_acquireNextImage")),
            Err(Error::MediaStatus { status, .. }) if status.is_no_buffer_available() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ImageReader {
    fn drop(&mut self) {
        // Safe because we own the reader. Images acquired from it borrow nothing from this handle
        // but the NDK keeps them valid until they are deleted.
        unsafe { bindings::AImageReader_delete(self.ptr.as_ptr()) };
    }
}

/// An image acquired from an `ImageReader`, deleted (returned to the reader) on drop.
pub struct Image {
    ptr: NonNull<bindings::AImage>,
}

impl Image {
    fn query(
        &self,
        call: &'static str,
        f: unsafe extern "C" fn(*const bindings::AImage, *mut i32) -> bindings::media_status_t,
    ) -> Result<i32> {
        let mut value = 0;
        // Safe because the image is valid and `value` is a valid place to write to.
        let status = unsafe { f(self.ptr.as_ptr(), &mut value) };
        MediaStatus::check(call, status)?;
        Ok(value)
    }

    fn query_plane(
        &self,
        call: &'static str,
        plane: usize,
        f: unsafe extern "C" fn(
            *const bindings::AImage,
            c_int,
            *mut i32,
        ) -> bindings::media_status_t,
    ) -> Result<i32> {
        let plane = c_int::try_from(plane).map_err(|_| Error::OutOfRange("plane"))?;
        let mut value = 0;
        // Safe because the image is valid and `value` is a valid place to write to.
        let status = unsafe { f(self.ptr.as_ptr(), plane, &mut value) };
        MediaStatus::check(call, status)?;
        Ok(value)
    }

    pub fn width(&self) -> Result<i32> {
        self.query("AImage_getWidth", bindings::AImage_getWidth)
    }

    pub fn height(&self) -> Result<i32> {
        self.query("AImage_getHeight", bindings::AImage_getHeight)
    }

    pub fn num_planes(&self) -> Result<usize> {
        let planes = self.query("AImage_getNumberOfPlanes", bindings::AImage_getNumberOfPlanes)?;
        usize::try_from(planes).map_err(|_| Error::OutOfRange("number of planes"))
    }

    /// Returns the bytes of `plane`, valid for as long as the image is held.
    pub fn plane_data(&self, plane: usize) -> Result<&[u8]> {
        let plane = c_int::try_from(plane).map_err(|_| Error::OutOfRange("plane"))?;
        let mut data = ptr::null_mut();
        let mut len: c_int = 0;
        // Safe because the image is valid and `data`/`len` are valid places to write to.
        let status =
            unsafe { bindings::AImage_getPlaneData(self.ptr.as_ptr(), plane, &mut data, &mut len) };
        MediaStatus::check("AImage_getPlaneData", status)?;
        if data.is_null() {
            return Err(Error::NullHandle("AImage_getPlaneData"));
        }
        let len = usize::try_from(len).map_err(|_| Error::OutOfRange("plane length"))?;
        // Safe because the NDK guarantees `data` points to `len` readable bytes until the image is
        // deleted, and the returned slice borrows `self`.
        Ok(unsafe { slice::from_raw_parts(data, len) })
    }

    pub fn plane_row_stride(&self, plane: usize) -> Result<u32> {
        let stride = self.query_plane(
            "AImage_getPlaneRowStride",
            plane,
            bindings::AImage_getPlaneRowStride,
        )?;
        u32::try_from(stride).map_err(|_| Error::OutOfRange("row stride"))
    }

    pub fn plane_pixel_stride(&self, plane: usize) -> Result<u32> {
        let stride = self.query_plane(
            "AImage_getPlanePixelStride",
            plane,
            bindings::AImage_getPlanePixelStride,
        )?;
        u32::try_from(stride).map_err(|_| Error::OutOfRange("pixel stride"))
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        // Safe because we own the image and never use it again.
        unsafe { bindings::AImage_delete(self.ptr.as_ptr()) };
    }
}
