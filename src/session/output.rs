// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::thread;

use anyhow::Context;
use base::debug;
use base::info;
use base::warn;

use super::DecoderSession;
use super::Deadline;
use super::ImageOf;
use super::InFlightImage;
use crate::backend::DecoderBackend;
use crate::backend::HardwareDecoder;
use crate::backend::OutputStatus;
use crate::error::*;

impl<B: DecoderBackend> DecoderSession<B> {
    /// Polls the output queue until a decoded frame has been acquired from the frame reader.
    pub(super) fn drain_output(&mut self) -> Result<()> {
        if self.in_flight.is_some() {
            return Err(Error::FrameInFlight);
        }
        // A reader left behind by a failed rebind is replaced before waiting on it.
        self.sync_binding()?;
        let mut deadline = Deadline::new(self.config.stall_timeout());

        loop {
            let decoder = self.decoder.as_mut().ok_or(Error::NotInitialized)?;
            let raw = decoder.dequeue_output_buffer(self.config.dequeue_timeout_us);
            match OutputStatus::from_raw(raw).ok_or(Error::UnknownOutputStatus(raw))? {
                OutputStatus::FrameReady(index) => {
                    decoder
                        .release_output_buffer(index, true)
                        .with_context(|| format!("while rendering output buffer {}", index))?;
                    let image = self.acquire_image(&deadline)?;
                    self.in_flight = Some(image);
                    self.stats.frames_decoded += 1;
                    return Ok(());
                }
                OutputStatus::FormatChanged => {
                    info!("decoder output format changed");
                    self.stats.format_changes += 1;
                    self.negotiate_output()?;
                    deadline.reset();
                }
                OutputStatus::TryAgainLater => {
                    warn!("no decoder output yet, trying again later");
                    deadline.check()?;
                }
                OutputStatus::BuffersChanged => {
                    warn!("ignoring deprecated output buffers changed notification");
                    deadline.reset();
                }
            }
        }
    }

    /// Waits for the frame just rendered to show up in the frame reader.
    fn acquire_image(&mut self, deadline: &Deadline) -> Result<InFlightImage<ImageOf<B>>> {
        let binding = self.binding.as_mut().ok_or(Error::NotInitialized)?;
        loop {
            if let Some(image) = binding.acquire_next_image()? {
                return Ok(image);
            }
            debug!("decoded image not available yet");
            deadline.check()?;
            thread::sleep(self.config.image_poll_interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::fake::FailPoint;
    use crate::backend::fake::FakeBackend;
    use crate::session::DecoderSession;
    use crate::Error;
    use crate::SessionConfig;

    fn started(backend: &FakeBackend) -> DecoderSession<FakeBackend> {
        let mut session = DecoderSession::new(backend.clone(), SessionConfig::default()).unwrap();
        session.submit_input(b"unit").unwrap();
        session
    }

    #[test]
    fn skips_informational_statuses() {
        let backend = FakeBackend::new();
        let mut session = started(&backend);
        backend.push_output_status(-1);
        backend.push_output_status(-3);
        backend.push_output_status(-2);
        backend.push_output_status(-1);

        session.drain_output().unwrap();
        let stats = session.stats();
        assert_eq!(stats.frames_decoded, 1);
        assert_eq!(stats.format_changes, 1);
        assert_eq!(stats.rebinds, 0);
        assert_eq!(backend.live_images(), 1);
    }

    #[test]
    fn unknown_status_is_fatal() {
        let backend = FakeBackend::new();
        let mut session = started(&backend);
        backend.push_output_status(-4);

        assert!(matches!(
            session.drain_output(),
            Err(Error::UnknownOutputStatus(-4))
        ));
        assert_eq!(backend.live_images(), 0);
    }

    #[test]
    fn waits_for_the_image() {
        let backend = FakeBackend::new();
        let mut session = started(&backend);
        backend.delay_images(3);

        session.drain_output().unwrap();
        assert_eq!(backend.live_images(), 1);
    }

    #[test]
    fn image_acquisition_failure_is_fatal() {
        let backend = FakeBackend::new();
        let mut session = started(&backend);
        backend.fail_at(FailPoint::AcquireImage);

        assert!(matches!(
            session.drain_output(),
            Err(Error::BackendFailure(_))
        ));
        assert!(session.current_frame().is_none());
    }

    #[test]
    fn second_frame_requires_release() {
        let backend = FakeBackend::new();
        let mut session = started(&backend);
        session.drain_output().unwrap();

        assert!(matches!(session.drain_output(), Err(Error::FrameInFlight)));
        assert_eq!(backend.live_images(), 1);

        session.release_frame();
        assert_eq!(backend.live_images(), 0);
    }
}
