// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::CStr;
use std::os::raw::c_char;

const SDK_VERSION_PROPERTY: &[u8] = b"ro.build.version.sdk\0";

/// Returns the API level of the running device, read from `ro.build.version.sdk`.
pub fn device_api_level() -> Option<u32> {
    let mut value = [0 as c_char; libc::PROP_VALUE_MAX as usize];
    // Safe because the name is NUL-terminated and `value` is PROP_VALUE_MAX bytes long, the
    // maximum the function writes.
    let len = unsafe {
        libc::__system_property_get(
            SDK_VERSION_PROPERTY.as_ptr() as *const c_char,
            value.as_mut_ptr(),
        )
    };
    if len <= 0 {
        return None;
    }
    // Safe because the function NUL-terminates what it wrote.
    let value = unsafe { CStr::from_ptr(value.as_ptr()) };
    value.to_str().ok()?.trim().parse().ok()
}
