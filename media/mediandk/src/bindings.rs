// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Declarations for the subset of `NdkMediaCodec.h`, `NdkMediaFormat.h`, `NdkImageReader.h`,
//! `NdkImage.h` and `native_window.h` used by this crate.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

use std::os::raw::c_char;
use std::os::raw::c_int;

pub type media_status_t = c_int;

pub const AMEDIA_OK: media_status_t = 0;
pub const AMEDIACODEC_ERROR_INSUFFICIENT_RESOURCE: media_status_t = 1100;
pub const AMEDIACODEC_ERROR_RECLAIMED: media_status_t = 1101;
pub const AMEDIA_ERROR_UNKNOWN: media_status_t = -10000;
pub const AMEDIA_ERROR_MALFORMED: media_status_t = -10001;
pub const AMEDIA_ERROR_UNSUPPORTED: media_status_t = -10002;
pub const AMEDIA_ERROR_INVALID_OBJECT: media_status_t = -10003;
pub const AMEDIA_ERROR_INVALID_PARAMETER: media_status_t = -10004;
pub const AMEDIA_ERROR_INVALID_OPERATION: media_status_t = -10005;
pub const AMEDIA_ERROR_END_OF_STREAM: media_status_t = -10006;
pub const AMEDIA_ERROR_IO: media_status_t = -10007;
pub const AMEDIA_ERROR_WOULD_BLOCK: media_status_t = -10008;
pub const AMEDIA_IMGREADER_NO_BUFFER_AVAILABLE: media_status_t = -30001;
pub const AMEDIA_IMGREADER_MAX_IMAGES_ACQUIRED: media_status_t = -30002;
pub const AMEDIA_IMGREADER_CANNOT_LOCK_IMAGE: media_status_t = -30003;
pub const AMEDIA_IMGREADER_CANNOT_UNLOCK_IMAGE: media_status_t = -30004;
pub const AMEDIA_IMGREADER_IMAGE_NOT_LOCKED: media_status_t = -30005;

pub const AMEDIACODEC_INFO_OUTPUT_BUFFERS_CHANGED: isize = -3;
pub const AMEDIACODEC_INFO_OUTPUT_FORMAT_CHANGED: isize = -2;
pub const AMEDIACODEC_INFO_TRY_AGAIN_LATER: isize = -1;

pub const AIMAGE_FORMAT_YUV_420_888: i32 = 0x23;

#[repr(C)]
pub struct AMediaCodec {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct AMediaFormat {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct AMediaCrypto {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct AImageReader {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct AImage {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct ANativeWindow {
    _unused: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct AMediaCodecBufferInfo {
    pub offset: i32,
    pub size: i32,
    pub presentationTimeUs: i64,
    pub flags: u32,
}

extern "C" {
    pub fn AMediaCodec_createDecoderByType(mime_type: *const c_char) -> *mut AMediaCodec;
    pub fn AMediaCodec_delete(codec: *mut AMediaCodec) -> media_status_t;
    pub fn AMediaCodec_getName(codec: *mut AMediaCodec, out_name: *mut *mut c_char)
        -> media_status_t;
    pub fn AMediaCodec_releaseName(codec: *mut AMediaCodec, name: *mut c_char);
    pub fn AMediaCodec_configure(
        codec: *mut AMediaCodec,
        format: *const AMediaFormat,
        surface: *mut ANativeWindow,
        crypto: *mut AMediaCrypto,
        flags: u32,
    ) -> media_status_t;
    pub fn AMediaCodec_start(codec: *mut AMediaCodec) -> media_status_t;
    pub fn AMediaCodec_stop(codec: *mut AMediaCodec) -> media_status_t;
    pub fn AMediaCodec_getInputBuffer(
        codec: *mut AMediaCodec,
        idx: usize,
        out_size: *mut usize,
    ) -> *mut u8;
    pub fn AMediaCodec_dequeueInputBuffer(codec: *mut AMediaCodec, timeoutUs: i64) -> isize;
    pub fn AMediaCodec_queueInputBuffer(
        codec: *mut AMediaCodec,
        idx: usize,
        offset: libc::off_t,
        size: usize,
        time: u64,
        flags: u32,
    ) -> media_status_t;
    pub fn AMediaCodec_dequeueOutputBuffer(
        codec: *mut AMediaCodec,
        info: *mut AMediaCodecBufferInfo,
        timeoutUs: i64,
    ) -> isize;
    pub fn AMediaCodec_releaseOutputBuffer(
        codec: *mut AMediaCodec,
        idx: usize,
        render: bool,
    ) -> media_status_t;
    pub fn AMediaCodec_getInputFormat(codec: *mut AMediaCodec) -> *mut AMediaFormat;
    pub fn AMediaCodec_getOutputFormat(codec: *mut AMediaCodec) -> *mut AMediaFormat;
    pub fn AMediaCodec_setOutputSurface(
        codec: *mut AMediaCodec,
        surface: *mut ANativeWindow,
    ) -> media_status_t;
    pub fn AMediaCodec_setParameters(
        codec: *mut AMediaCodec,
        params: *const AMediaFormat,
    ) -> media_status_t;

    pub fn AMediaFormat_new() -> *mut AMediaFormat;
    pub fn AMediaFormat_delete(format: *mut AMediaFormat) -> media_status_t;
    pub fn AMediaFormat_toString(format: *mut AMediaFormat) -> *const c_char;
    pub fn AMediaFormat_getInt32(
        format: *mut AMediaFormat,
        name: *const c_char,
        out: *mut i32,
    ) -> bool;
    pub fn AMediaFormat_getString(
        format: *mut AMediaFormat,
        name: *const c_char,
        out: *mut *const c_char,
    ) -> bool;
    pub fn AMediaFormat_setInt32(format: *mut AMediaFormat, name: *const c_char, value: i32);
    pub fn AMediaFormat_setString(
        format: *mut AMediaFormat,
        name: *const c_char,
        value: *const c_char,
    );

    pub fn AImageReader_new(
        width: i32,
        height: i32,
        format: i32,
        maxImages: i32,
        reader: *mut *mut AImageReader,
    ) -> media_status_t;
    pub fn AImageReader_delete(reader: *mut AImageReader);
    pub fn AImageReader_getWindow(
        reader: *mut AImageReader,
        window: *mut *mut ANativeWindow,
    ) -> media_status_t;
    pub fn AImageReader_acquireNextImage(
        reader: *mut AImageReader,
        image: *mut *mut AImage,
    ) -> media_status_t;

    pub fn AImage_delete(image: *mut AImage);
    pub fn AImage_getWidth(image: *const AImage, width: *mut i32) -> media_status_t;
    pub fn AImage_getHeight(image: *const AImage, height: *mut i32) -> media_status_t;
    pub fn AImage_getNumberOfPlanes(image: *const AImage, numPlanes: *mut i32) -> media_status_t;
    pub fn AImage_getPlaneData(
        image: *const AImage,
        planeIdx: c_int,
        data: *mut *mut u8,
        dataLength: *mut c_int,
    ) -> media_status_t;
    pub fn AImage_getPlaneRowStride(
        image: *const AImage,
        planeIdx: c_int,
        rowStride: *mut i32,
    ) -> media_status_t;
    pub fn AImage_getPlanePixelStride(
        image: *const AImage,
        planeIdx: c_int,
        pixelStride: *mut i32,
    ) -> media_status_t;

    pub fn ANativeWindow_acquire(window: *mut ANativeWindow);
    pub fn ANativeWindow_release(window: *mut ANativeWindow);
}
