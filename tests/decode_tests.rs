// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Integration tests decoding through the fake backend.

use h264_mediacodec::backend::fake::FailPoint;
use h264_mediacodec::backend::fake::FakeBackend;
use h264_mediacodec::*;

fn create_session(backend: &FakeBackend, config: SessionConfig) -> DecoderSession<FakeBackend> {
    base::syslog::test_only_ensure_inited();
    DecoderSession::new(backend.clone(), config).expect("failed to create a decode session")
}

fn unit(data: &[u8], width: u32, height: u32) -> EncodedUnit<'_> {
    EncodedUnit {
        data,
        width,
        height,
    }
}

fn check_frame(frame: &Frame, width: u32, height: u32) {
    assert_eq!((frame.width, frame.height), (width, height));
    for plane in frame.planes.iter() {
        assert!(!plane.data.is_empty());
        assert!(plane.pixel_stride >= 1);
    }
    let [y, u, v] = frame.planes;
    assert!(y.row_stride >= width);
    assert!(u.row_stride * 2 / u.pixel_stride >= width / 2);
    assert!(v.row_stride * 2 / v.pixel_stride >= width / 2);
    assert!(y.data.len() >= (y.row_stride * (height - 1) + width) as usize);
}

#[test]
fn test_large_unit_is_split_in_order() {
    let backend = FakeBackend::new();
    backend.set_input_capacity(1000);
    let mut session = create_session(&backend, SessionConfig::default());

    let data: Vec<u8> = (0..3500u32).map(|i| (i % 251) as u8).collect();
    let frame = session
        .decode(unit(&data, 320, 240))
        .expect("failed to decode");
    check_frame(&frame, 320, 240);

    let chunks = backend.queued_chunks();
    assert_eq!(
        chunks.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![1000, 1000, 1000, 500]
    );
    assert_eq!(chunks.concat(), data);
}

#[test]
fn test_repeated_decodes_release_previous_frame() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());

    for i in 1..=5u8 {
        let frame = session
            .decode(unit(&[i; 64], 320, 240))
            .expect("failed to decode");
        check_frame(&frame, 320, 240);
        assert!(frame.planes[0].data.iter().all(|b| *b == i));
        assert_eq!(backend.live_images(), 1);
    }
    assert_eq!(session.stats().frames_decoded, 5);
    assert_eq!(backend.readers_created(), 1);
}

#[test]
fn test_second_frame_without_release_is_rejected() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());

    session.submit(unit(b"first", 320, 240)).unwrap();
    session.receive_frame().unwrap();
    session.submit(unit(b"second", 320, 240)).unwrap();
    assert!(matches!(session.receive_frame(), Err(Error::FrameInFlight)));
    assert_eq!(backend.live_images(), 1);

    session.release_frame();
    assert!(session.current_frame().is_none());
    session.receive_frame().unwrap();
    assert_eq!(backend.live_images(), 1);
}

#[test]
fn test_format_change_with_same_size_keeps_reader() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());
    session.decode(unit(b"unit", 320, 240)).unwrap();
    let window = backend.output_window();

    backend.push_output_status(-2);
    session.decode(unit(b"unit", 320, 240)).unwrap();

    assert_eq!(backend.readers_created(), 1);
    assert_eq!(backend.output_window(), window);
    assert_eq!(session.stats().format_changes, 1);
    assert_eq!(session.stats().rebinds, 0);
}

#[test]
fn test_format_change_with_new_size_rebinds_reader() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());
    session.decode(unit(b"unit", 320, 240)).unwrap();
    let old_window = backend.output_window();

    backend.set_output_size(640, 368);
    backend.push_output_status(-2);
    let frame = session.decode(unit(b"unit", 320, 240)).unwrap();
    check_frame(&frame, 640, 368);

    assert_eq!(backend.readers_created(), 2);
    assert_eq!(backend.live_readers(), 1);
    assert_eq!(backend.live_windows(), 1);
    assert_ne!(backend.output_window(), old_window);
    assert_eq!(session.output_geometry(), (640, 368));
    assert_eq!(session.input_geometry(), (320, 240));
    assert_eq!(session.stats().rebinds, 1);
}

#[test]
fn test_too_small_dimensions_leave_session_untouched() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());
    session.decode(unit(b"unit", 320, 240)).unwrap();
    let stats = session.stats();

    for (width, height) in [(319, 240), (320, 239), (16, 16)] {
        match session.decode(unit(b"unit", width, height)) {
            Err(Error::DimensionsTooSmall {
                min_width,
                min_height,
                ..
            }) => assert_eq!((min_width, min_height), (320, 240)),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("decoded a {}x{} unit", width, height),
        }
        assert_eq!(session.input_geometry(), (320, 240));
        assert_eq!(session.output_geometry(), (320, 240));
    }
    assert_eq!(session.stats().input_buffers_queued, stats.input_buffers_queued);
    assert!(backend.parameter_updates().is_empty());
    assert_eq!(backend.readers_created(), 1);

    // The session is still usable.
    session.decode(unit(b"unit", 320, 240)).unwrap();
}

#[test]
fn test_resolution_change_scenario() {
    let backend = FakeBackend::new();
    let config = SessionConfig {
        initial_width: Some(1920),
        initial_height: Some(1088),
        ..Default::default()
    };
    let mut session = create_session(&backend, config);
    assert_eq!(session.resize_strategy(), ResizeStrategy::SetParameters);

    let frame = session.decode(unit(&[1; 4096], 1920, 1088)).unwrap();
    check_frame(&frame, 1920, 1088);
    assert!(backend.parameter_updates().is_empty());

    let frame = session.decode(unit(&[2; 1024], 640, 480)).unwrap();
    check_frame(&frame, 640, 480);

    let updates = backend.parameter_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].geometry().unwrap(), (640, 480));
    assert_eq!(session.input_geometry(), (640, 480));
    assert_eq!(session.output_geometry(), (640, 480));
    assert_eq!(backend.readers_created(), 2);
    assert_eq!(backend.decoder_starts(), 1);
}

#[test]
fn test_reconfigure_strategy() {
    let backend = FakeBackend::new().without_set_parameters();
    let mut session = create_session(&backend, SessionConfig::default());
    assert_eq!(session.resize_strategy(), ResizeStrategy::Reconfigure);
    session.decode(unit(b"unit", 320, 240)).unwrap();

    let frame = session.decode(unit(b"unit", 1280, 720)).unwrap();
    check_frame(&frame, 1280, 720);

    assert!(backend.parameter_updates().is_empty());
    let configured = backend.configured_formats();
    assert_eq!(configured.len(), 2);
    assert_eq!(configured[1].geometry().unwrap(), (1280, 720));
    assert_eq!(backend.decoder_stops(), 1);
    assert_eq!(backend.decoder_starts(), 2);
    assert!(backend.is_running());
}

#[test]
fn test_forced_resize_strategy() {
    let backend = FakeBackend::new();
    let config = SessionConfig::from_json(r#"{"resize-strategy": "reconfigure"}"#).unwrap();
    let session = create_session(&backend, config);
    assert_eq!(session.resize_strategy(), ResizeStrategy::Reconfigure);
}

#[test]
fn test_unknown_output_status() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());

    backend.push_output_status(-1000);
    assert!(matches!(
        session.decode(unit(b"unit", 320, 240)),
        Err(Error::UnknownOutputStatus(-1000))
    ));
    // The session survives a failed decode.
    session.decode(unit(b"unit", 320, 240)).unwrap();
}

#[test]
fn test_output_format_without_size_is_an_error() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());

    backend.hide_output_geometry();
    backend.push_output_status(-2);
    assert!(matches!(
        session.decode(unit(b"unit", 320, 240)),
        Err(Error::InvalidFormat("width"))
    ));
}

#[test]
fn test_rebind_failure_keeps_the_current_reader() {
    let backend = FakeBackend::new();
    let mut session = create_session(&backend, SessionConfig::default());
    session.decode(unit(b"unit", 320, 240)).unwrap();
    let old_window = backend.output_window();

    backend.fail_at(FailPoint::SetOutputWindow);
    assert!(matches!(
        session.decode(unit(b"unit", 640, 480)),
        Err(Error::BackendFailure(_))
    ));
    assert_eq!(backend.live_readers(), 1);
    assert_eq!(backend.live_windows(), 1);
    assert_eq!(backend.output_window(), old_window);

    // The next unit at the same size finishes the rebind.
    backend.clear_failure(FailPoint::SetOutputWindow);
    for _ in 0..3 {
        let frame = session.decode(unit(b"unit", 640, 480)).unwrap();
        check_frame(&frame, 640, 480);
    }
    assert_eq!(backend.live_readers(), 1);
    assert_ne!(backend.output_window(), old_window);
    assert_eq!(session.stats().rebinds, 1);
}

#[test]
fn test_output_size_reported_at_configuration() {
    let backend = FakeBackend::new();
    backend.set_output_size(320, 256);
    let mut session = create_session(&backend, SessionConfig::default());

    assert_eq!(session.input_geometry(), (320, 240));
    assert_eq!(session.output_geometry(), (320, 256));
    assert_eq!(backend.readers_created(), 2);
    assert_eq!(backend.live_readers(), 1);
    assert_eq!(session.stats().rebinds, 1);

    let frame = session.decode(unit(b"unit", 320, 240)).unwrap();
    check_frame(&frame, 320, 256);
    assert_eq!(backend.readers_created(), 2);
}

#[test]
fn test_failed_reconfigure_restores_previous_size() {
    let backend = FakeBackend::new().without_set_parameters();
    let mut session = create_session(&backend, SessionConfig::default());
    session.decode(unit(b"unit", 320, 240)).unwrap();

    backend.fail_once(FailPoint::Configure);
    assert!(matches!(
        session.decode(unit(b"unit", 1280, 720)),
        Err(Error::BackendFailure(_))
    ));
    assert!(backend.is_running());
    assert_eq!(session.input_geometry(), (320, 240));
    let configured = backend.configured_formats();
    assert_eq!(configured.len(), 2);
    assert_eq!(configured[1].geometry().unwrap(), (320, 240));

    let frame = session.decode(unit(b"unit", 320, 240)).unwrap();
    check_frame(&frame, 320, 240);
    assert_eq!(backend.decoder_starts(), 2);
}

#[test]
fn test_stopped_decoder_is_restarted() {
    let backend = FakeBackend::new().without_set_parameters();
    let config = SessionConfig {
        dequeue_timeout_us: 0,
        stall_timeout_ms: Some(1000),
        ..Default::default()
    };
    let mut session = create_session(&backend, config);

    backend.fail_at(FailPoint::Configure);
    assert!(session.decode(unit(b"unit", 1280, 720)).is_err());
    assert!(!backend.is_running());
    assert_eq!(session.input_geometry(), (320, 240));

    backend.clear_failure(FailPoint::Configure);
    let frame = session.decode(unit(b"unit", 320, 240)).unwrap();
    check_frame(&frame, 320, 240);
    assert!(backend.is_running());

    let frame = session.decode(unit(b"unit", 1280, 720)).unwrap();
    check_frame(&frame, 1280, 720);
}
