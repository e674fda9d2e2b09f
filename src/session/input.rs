// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::anyhow;
use anyhow::Context;
use base::debug;
use base::warn;

use super::DecoderSession;
use super::Deadline;
use crate::backend::DecoderBackend;
use crate::backend::HardwareDecoder;
use crate::error::*;

impl<B: DecoderBackend> DecoderSession<B> {
    /// Copies `data` into as many input buffers as needed and queues them in order.
    pub(super) fn submit_input(&mut self, data: &[u8]) -> Result<()> {
        let decoder = self.decoder.as_mut().ok_or(Error::NotInitialized)?;
        let mut deadline = Deadline::new(self.config.stall_timeout());
        let mut remaining = data;

        while !remaining.is_empty() {
            let raw = decoder.dequeue_input_buffer(self.config.dequeue_timeout_us);
            let index = match usize::try_from(raw) {
                Ok(index) => index,
                Err(_) => {
                    debug!("no input buffer available ({}), retrying", raw);
                    deadline.check()?;
                    continue;
                }
            };

            let copied = {
                let buffer = decoder
                    .input_buffer(index)
                    .with_context(|| format!("while getting input buffer {}", index))?;
                if buffer.is_empty() {
                    return Err(anyhow!("input buffer {} has no capacity", index).into());
                }
                if buffer.len() < remaining.len() {
                    warn!(
                        "input buffer capacity {} is less than the {} bytes left, splitting",
                        buffer.len(),
                        remaining.len()
                    );
                }
                let len = buffer.len().min(remaining.len());
                buffer[..len].copy_from_slice(&remaining[..len]);
                len
            };

            decoder
                .queue_input_buffer(index, copied)
                .with_context(|| format!("while queueing input buffer {}", index))?;
            self.stats.input_buffers_queued += 1;
            remaining = &remaining[copied..];
            deadline.reset();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::backend::fake::FailPoint;
    use crate::backend::fake::FakeBackend;
    use crate::session::DecoderSession;
    use crate::Error;
    use crate::SessionConfig;

    fn session(backend: &FakeBackend) -> DecoderSession<FakeBackend> {
        DecoderSession::new(backend.clone(), SessionConfig::default()).unwrap()
    }

    #[test]
    fn splits_units_larger_than_a_buffer() {
        let backend = FakeBackend::new();
        backend.set_input_capacity(4);
        let mut session = session(&backend);

        session.submit_input(b"0123456789").unwrap();
        assert_eq!(
            backend.queued_chunks(),
            vec![b"0123".to_vec(), b"4567".to_vec(), b"89".to_vec()]
        );
        assert_eq!(session.stats().input_buffers_queued, 3);
    }

    #[test]
    fn retries_while_no_buffer_is_available() {
        let backend = FakeBackend::new();
        let mut session = session(&backend);
        backend.delay_input(5);

        session.submit_input(b"unit").unwrap();
        assert_eq!(backend.queued_chunks(), vec![b"unit".to_vec()]);
    }

    #[test]
    fn queue_failure_is_not_retried() {
        let backend = FakeBackend::new();
        backend.set_input_capacity(2);
        let mut session = session(&backend);
        backend.fail_at(FailPoint::QueueInput);

        assert!(matches!(
            session.submit_input(b"unit"),
            Err(Error::BackendFailure(_))
        ));
        assert!(backend.queued_chunks().is_empty());
        assert_eq!(session.stats().input_buffers_queued, 0);
    }

    #[test]
    fn missing_input_buffer_is_fatal() {
        let backend = FakeBackend::new();
        let mut session = session(&backend);
        backend.fail_at(FailPoint::InputBuffer);

        assert!(session.submit_input(b"unit").is_err());
        assert!(backend.queued_chunks().is_empty());
    }

    #[test]
    fn stalls_after_the_deadline() {
        let backend = FakeBackend::new();
        let config = SessionConfig {
            dequeue_timeout_us: 0,
            stall_timeout_ms: Some(1),
            ..Default::default()
        };
        let mut session = DecoderSession::new(backend.clone(), config).unwrap();
        backend.delay_input(usize::MAX);

        match session.submit_input(b"unit") {
            Err(Error::Stalled(limit)) => assert_eq!(limit, Duration::from_millis(1)),
            other => panic!("expected a stall, got {:?}", other),
        }
    }
}
