// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Safe bindings for the parts of Android's `libmediandk` needed to drive a hardware video
//! decoder: `AMediaCodec`, `AMediaFormat`, `AImageReader` and the `ANativeWindow` that ties the
//! last two together.
//!
//! Every native handle is wrapped in an owning type that releases it exactly once on drop. All
//! unsafe code of the workspace that touches the NDK lives in this crate.

#![cfg(target_os = "android")]

mod bindings;
mod codec;
mod error;
mod format;
mod image_reader;
mod system;

pub use codec::*;
pub use error::*;
pub use format::*;
pub use image_reader::*;
pub use system::*;
