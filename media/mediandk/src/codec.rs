// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CStr;
use std::ffi::CString;
use std::ptr;
use std::ptr::NonNull;
use std::slice;

use base::error;

use crate::bindings;
use crate::error::*;
use crate::format::MediaFormat;
use crate::image_reader::NativeWindow;

pub use bindings::AMediaCodecBufferInfo as BufferInfo;

/// An owned `AMediaCodec` decoder instance.
pub struct MediaCodec {
    ptr: NonNull<bindings::AMediaCodec>,
}

impl MediaCodec {
    /// Creates the preferred decoder for `mime`, e.g. `video/avc`.
    pub fn create_decoder_by_type(mime: &str) -> Result<Self> {
        let mime = CString::new(mime)?;
        // Safe because `mime` is a valid NUL-terminated string and we check the result.
        let ptr = unsafe { bindings::AMediaCodec_createDecoderByType(mime.as_ptr()) };
        NonNull::new(ptr)
            .map(|ptr| MediaCodec { ptr })
            .ok_or(Error::NullHandle("AMediaCodec_createDecoderByType"))
    }

    fn as_ptr(&self) -> *mut bindings::AMediaCodec {
        self.ptr.as_ptr()
    }

    /// Returns the name of the component backing this codec, e.g. `c2.qti.avc.decoder`.
    pub fn name(&self) -> Result<String> {
        let mut name = ptr::null_mut();
        // Safe because the codec is valid and `name` is a valid place to write to.
        let status = unsafe { bindings::AMediaCodec_getName(self.as_ptr(), &mut name) };
        MediaStatus::check("AMediaCodec_getName", status)?;
        if name.is_null() {
            return Err(Error::NullHandle("AMediaCodec_getName"));
        }
        // Safe because libmediandk returned a valid NUL-terminated string, which we copy before
        // handing it back.
        let owned = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
        // Safe because `name` was returned by `AMediaCodec_getName` on this codec.
        unsafe { bindings::AMediaCodec_releaseName(self.as_ptr(), name) };
        Ok(owned)
    }

    /// Configures the codec with `format`, rendering decoded frames to `window` if given.
    pub fn configure(&mut self, format: &MediaFormat, window: Option<&NativeWindow>) -> Result<()> {
        let window = window.map_or(ptr::null_mut(), NativeWindow::as_ptr);
        // Safe because the codec and format are valid, and `window` is either null or a window we
        // hold a reference to. The codec takes its own reference on the window.
        let status = unsafe {
            bindings::AMediaCodec_configure(
                self.as_ptr(),
                format.as_ptr(),
                window,
                ptr::null_mut(),
                0,
            )
        };
        MediaStatus::check("AMediaCodec_configure", status)
    }

    /// Switches the window decoded frames are rendered to, without reconfiguring.
    pub fn set_output_surface(&mut self, window: &NativeWindow) -> Result<()> {
        // Safe because the codec and window are valid. The codec takes its own reference.
        let status =
            unsafe { bindings::AMediaCodec_setOutputSurface(self.as_ptr(), window.as_ptr()) };
        MediaStatus::check("AMediaCodec_setOutputSurface", status)
    }

    /// Applies `params` to a running codec. Requires API level 26.
    pub fn set_parameters(&mut self, params: &MediaFormat) -> Result<()> {
        // Safe because the codec and format are valid.
        let status = unsafe { bindings::AMediaCodec_setParameters(self.as_ptr(), params.as_ptr()) };
        MediaStatus::check("AMediaCodec_setParameters", status)
    }

    pub fn start(&mut self) -> Result<()> {
        // Safe because the codec is valid.
        let status = unsafe { bindings::AMediaCodec_start(self.as_ptr()) };
        MediaStatus::check("AMediaCodec_start", status)
    }

    pub fn stop(&mut self) -> Result<()> {
        // Safe because the codec is valid.
        let status = unsafe { bindings::AMediaCodec_stop(self.as_ptr()) };
        MediaStatus::check("AMediaCodec_stop", status)
    }

    /// Returns the index of an available input buffer, or a negative value if none became
    /// available within `timeout_us` (negative waits forever).
    pub fn dequeue_input_buffer(&mut self, timeout_us: i64) -> isize {
        // Safe because the codec is valid.
        unsafe { bindings::AMediaCodec_dequeueInputBuffer(self.as_ptr(), timeout_us) }
    }

    /// Returns the input buffer at `index`, which must have been dequeued and not yet queued.
    pub fn input_buffer(&mut self, index: usize) -> Result<&mut [u8]> {
        let mut size = 0usize;
        // Safe because the codec is valid and `size` is a valid place to write to.
        let data =
            unsafe { bindings::AMediaCodec_getInputBuffer(self.as_ptr(), index, &mut size) };
        if data.is_null() {
            return Err(Error::NullHandle("AMediaCodec_getInputBuffer"));
        }
        // Safe because the codec owns `size` writable bytes at `data` until the buffer is queued,
        // and the returned slice mutably borrows the codec so it cannot be queued meanwhile.
        Ok(unsafe { slice::from_raw_parts_mut(data, size) })
    }

    /// Hands `size` bytes of the input buffer at `index` to the codec.
    pub fn queue_input_buffer(
        &mut self,
        index: usize,
        size: usize,
        presentation_time_us: u64,
        flags: u32,
    ) -> Result<()> {
        // Safe because the codec is valid. The codec checks `index` and `size` itself.
        let status = unsafe {
            bindings::AMediaCodec_queueInputBuffer(
                self.as_ptr(),
                index,
                0,
                size,
                presentation_time_us,
                flags,
            )
        };
        MediaStatus::check("AMediaCodec_queueInputBuffer", status)
    }

    /// Waits up to `timeout_us` for an output buffer.
    ///
    /// Returns the raw result of `AMediaCodec_dequeueOutputBuffer`: a buffer index or one of the
    /// negative `AMEDIACODEC_INFO_*` codes, along with the buffer metadata.
    pub fn dequeue_output_buffer(&mut self, timeout_us: i64) -> (isize, BufferInfo) {
        let mut info = BufferInfo::default();
        // Safe because the codec is valid and `info` is a valid place to write to.
        let status = unsafe {
            bindings::AMediaCodec_dequeueOutputBuffer(self.as_ptr(), &mut info, timeout_us)
        };
        (status, info)
    }

    /// Returns the output buffer at `index` to the codec, rendering it to the output window first
    /// if `render` is set.
    pub fn release_output_buffer(&mut self, index: usize, render: bool) -> Result<()> {
        // Safe because the codec is valid. The codec checks `index` itself.
        let status =
            unsafe { bindings::AMediaCodec_releaseOutputBuffer(self.as_ptr(), index, render) };
        MediaStatus::check("AMediaCodec_releaseOutputBuffer", status)
    }

    pub fn input_format(&self) -> Result<MediaFormat> {
        // Safe because the codec is valid, and the returned format is ours to delete.
        unsafe {
            MediaFormat::from_raw(
                "AMediaCodec_getInputFormat",
                bindings::AMediaCodec_getInputFormat(self.as_ptr()),
            )
        }
    }

    pub fn output_format(&self) -> Result<MediaFormat> {
        // Safe because the codec is valid, and the returned format is ours to delete.
        unsafe {
            MediaFormat::from_raw(
                "AMediaCodec_getOutputFormat",
                bindings::AMediaCodec_getOutputFormat(self.as_ptr()),
            )
        }
    }
}

impl Drop for MediaCodec {
    fn drop(&mut self) {
        // Safe because we own the codec and never use it again.
        let status = unsafe { bindings::AMediaCodec_delete(self.as_ptr()) };
        if let Err(e) = MediaStatus::check("AMediaCodec_delete", status) {
            error!("{}", e);
        }
    }
}
