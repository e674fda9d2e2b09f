// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Common facilities shared by the crates of the workspace.
//!
//! Crates log through the macros re-exported here rather than depending on `log` directly, so the
//! process-wide logger installed by [`syslog::init`] sees every message.

pub mod syslog;

pub use log::debug;
pub use log::error;
pub use log::info;
pub use log::trace;
pub use log::warn;
