// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

fn main() {
    // Skip linking when generating documents.
    if std::env::var("CARGO_DOC").is_ok() {
        return;
    }

    // libmediandk and libandroid only exist on Android targets. Host builds compile the crate to
    // nothing, so there is nothing to link.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("android") {
        return;
    }

    println!("cargo:rustc-link-lib=dylib=mediandk");
    println!("cargo:rustc-link-lib=dylib=android");
}
