// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use base::syslog::add_path_log_level;
use base::syslog::log_enabled;
use base::syslog::test_only_ensure_inited;
use base::syslog::Priority;
use base::syslog::PriorityFilter;

#[test]
fn macros() {
    test_only_ensure_inited();
    base::error!("this is an error {}", 3);
    base::warn!("this is a warning {}", "uh oh");
    base::info!("this is info {}", true);
    base::debug!("this is debug info {:?}", Some("helpful stuff"));
}

#[test]
fn init_is_repeatable() {
    test_only_ensure_inited();
    assert!(base::syslog::init().is_ok());
    assert!(base::syslog::init().is_ok());
}

#[test]
fn log_priority_try_from_number() {
    assert_eq!("3".try_into(), Ok(Priority::Error));
    assert!(Priority::try_from("100").is_err());
}

#[test]
fn log_priority_try_from_words() {
    assert_eq!("WARNING".try_into(), Ok(Priority::Warning));
    assert!(Priority::try_from("_WARNING").is_err());
}

#[test]
fn path_log_level_overrides_default() {
    test_only_ensure_inited();
    add_path_log_level("syslog_test::quiet", PriorityFilter::Silent);
    add_path_log_level("syslog_test::quiet::loud", Priority::Debug);

    assert!(!log_enabled(Priority::Error, Some("syslog_test::quiet")));
    assert!(!log_enabled(Priority::Error, Some("syslog_test::quiet::inner")));
    assert!(log_enabled(Priority::Debug, Some("syslog_test::quiet::loud")));
    assert!(log_enabled(Priority::Debug, Some("syslog_test::quietly")));
}
