// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CStr;
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_char;
use std::ptr;
use std::ptr::NonNull;

use base::error;

use crate::bindings;
use crate::error::*;

/// An owned `AMediaFormat`, deleted when dropped.
pub struct MediaFormat {
    // Valid pointer obtained from `AMediaFormat_new` or a codec format getter, owned by us.
    ptr: NonNull<bindings::AMediaFormat>,
}

impl MediaFormat {
    /// Creates an empty format.
    pub fn new() -> Result<Self> {
        // Safe because the function has no arguments and we check the result.
        let ptr = unsafe { bindings::AMediaFormat_new() };
        NonNull::new(ptr)
            .map(|ptr| MediaFormat { ptr })
            .ok_or(Error::NullHandle("AMediaFormat_new"))
    }

    /// Takes ownership of a format returned by libmediandk.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid format the caller is responsible for deleting.
    pub(crate) unsafe fn from_raw(
        call: &'static str,
        ptr: *mut bindings::AMediaFormat,
    ) -> Result<Self> {
        NonNull::new(ptr)
            .map(|ptr| MediaFormat { ptr })
            .ok_or(Error::NullHandle(call))
    }

    pub(crate) fn as_ptr(&self) -> *mut bindings::AMediaFormat {
        self.ptr.as_ptr()
    }

    pub fn set_i32(&mut self, key: &str, value: i32) -> Result<()> {
        let key = CString::new(key)?;
        // Safe because the format is valid and `key` outlives the call; the format copies it.
        unsafe { bindings::AMediaFormat_setInt32(self.as_ptr(), key.as_ptr(), value) };
        Ok(())
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let key = CString::new(key)?;
        let value = CString::new(value)?;
        // Safe because the format is valid and both strings outlive the call; the format copies
        // them.
        unsafe { bindings::AMediaFormat_setString(self.as_ptr(), key.as_ptr(), value.as_ptr()) };
        Ok(())
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        let key = CString::new(key).ok()?;
        let mut value = 0i32;
        // Safe because the format is valid and `value` is a valid place to write to.
        match unsafe { bindings::AMediaFormat_getInt32(self.as_ptr(), key.as_ptr(), &mut value) } {
            true => Some(value),
            false => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        let key = CString::new(key).ok()?;
        let mut value: *const c_char = ptr::null();
        // Safe because the format is valid and `value` is a valid place to write to. The returned
        // string is owned by the format and copied before the format can change.
        let found =
            unsafe { bindings::AMediaFormat_getString(self.as_ptr(), key.as_ptr(), &mut value) };
        if !found || value.is_null() {
            return None;
        }
        // Safe because libmediandk returned a valid NUL-terminated string.
        Some(unsafe { CStr::from_ptr(value) }.to_string_lossy().into_owned())
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Safe because the format is valid. The string stays owned by the format.
        let s = unsafe { bindings::AMediaFormat_toString(self.as_ptr()) };
        if s.is_null() {
            return f.write_str("<invalid format>");
        }
        // Safe because libmediandk returned a valid NUL-terminated string.
        f.write_str(&unsafe { CStr::from_ptr(s) }.to_string_lossy())
    }
}

impl Drop for MediaFormat {
    fn drop(&mut self) {
        // Safe because we own the format and never use it again.
        let status = unsafe { bindings::AMediaFormat_delete(self.as_ptr()) };
        if let Err(e) = MediaStatus::check("AMediaFormat_delete", status) {
            error!("{}", e);
        }
    }
}
