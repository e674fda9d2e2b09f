// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Decode session driving a hardware decoder and the frame reader it renders into.
//!
//! A session owns the decoder, its current input and output formats, and the frame reader bound to
//! the negotiated output size. Each call to `decode` releases the previously returned frame,
//! applies any input size change, pushes the unit through the input queue and drains the output
//! queue until a frame comes out.

mod frame;
mod geometry;
mod input;
mod output;

use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use base::debug;
use base::error;
use base::info;
use base::warn;

pub use self::frame::Frame;
pub use self::frame::FrameReaderBinding;
pub use self::frame::InFlightImage;
use crate::backend::DecoderBackend;
use crate::backend::FrameReader;
use crate::backend::HardwareDecoder;
use crate::config::ResizeStrategy;
use crate::config::SessionConfig;
use crate::error::*;
use crate::format::build_format;
use crate::format::FormatDescription;

/// A compressed unit and the frame size the bitstream declares for it.
#[derive(Debug, Clone, Copy)]
pub struct EncodedUnit<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Counters describing the work a session has done so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_decoded: u64,
    pub input_buffers_queued: u64,
    pub format_changes: u64,
    pub rebinds: u64,
}

type ImageOf<B> = <<B as DecoderBackend>::Reader as FrameReader>::Image;

/// Time budget for one pump, when stall detection is enabled.
struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    fn new(limit: Option<Duration>) -> Self {
        Deadline {
            start: Instant::now(),
            limit,
        }
    }

    fn check(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.start.elapsed() > limit => Err(Error::Stalled(limit)),
            _ => Ok(()),
        }
    }

    /// Restarts the budget after the hardware made progress.
    fn reset(&mut self) {
        self.start = Instant::now();
    }
}

pub struct DecoderSession<B: DecoderBackend> {
    backend: B,
    config: SessionConfig,
    resize_strategy: ResizeStrategy,
    // Fields are released by `teardown` in this order.
    in_flight: Option<InFlightImage<ImageOf<B>>>,
    decoder: Option<B::Decoder>,
    running: bool,
    binding: Option<FrameReaderBinding<B::Reader>>,
    input_format: Option<FormatDescription>,
    output_format: Option<FormatDescription>,
    input_width: u32,
    input_height: u32,
    output_width: u32,
    output_height: u32,
    stats: SessionStats,
}

impl<B: DecoderBackend> DecoderSession<B> {
    /// Creates a decoder and frame reader at the configured initial size and starts decoding.
    ///
    /// Everything created along the way is released again if any step fails.
    pub fn new(backend: B, config: SessionConfig) -> Result<Self> {
        let (width, height) = config.initial_dimensions();
        config.check_dimensions(width, height)?;

        let resize_strategy = config.resize_strategy.unwrap_or_else(|| {
            if backend.supports_set_parameters() {
                ResizeStrategy::SetParameters
            } else {
                ResizeStrategy::Reconfigure
            }
        });

        let mut session = DecoderSession {
            backend,
            config,
            resize_strategy,
            in_flight: None,
            decoder: None,
            running: false,
            binding: None,
            input_format: None,
            output_format: None,
            input_width: width,
            input_height: height,
            output_width: width,
            output_height: height,
            stats: SessionStats::default(),
        };

        if let Err(e) = session.initialize() {
            session.teardown();
            return Err(e);
        }
        Ok(session)
    }

    fn initialize(&mut self) -> Result<()> {
        let decoder = self
            .backend
            .create_decoder(&self.config.mime)
            .with_context(|| format!("while creating a {} decoder", self.config.mime))?;
        match decoder.name() {
            Ok(name) => info!("using decoder {}", name),
            Err(e) => debug!("failed to query the decoder name: {:#}", e),
        }
        let decoder = self.decoder.insert(decoder);

        let format = build_format(
            &self.config.mime,
            self.input_width,
            self.input_height,
            self.config.color_format,
        );
        let binding = self.binding.insert(FrameReaderBinding::new(
            &mut self.backend,
            self.input_width,
            self.input_height,
            self.config.max_images,
        )?);

        debug!("configuring decoder with {}", format);
        decoder
            .configure(&format, binding.window())
            .context("while configuring the decoder")?;
        self.input_format = Some(format);
        self.refresh_formats()?;
        self.sync_binding()?;

        self.decoder
            .as_mut()
            .ok_or(Error::NotInitialized)?
            .start()
            .context("while starting the decoder")?;
        self.running = true;
        info!(
            "decoder started at {}x{} ({:?})",
            self.input_width, self.input_height, self.resize_strategy
        );
        Ok(())
    }

    /// Reads back the formats the decoder settled on after being configured.
    fn refresh_formats(&mut self) -> Result<()> {
        let decoder = self.decoder.as_ref().ok_or(Error::NotInitialized)?;
        let input = decoder
            .input_format()
            .context("while reading the decoder input format")?;
        debug!("negotiated input format: {}", input);
        let output = decoder
            .output_format()
            .context("while reading the decoder output format")?;
        debug!("negotiated output format: {}", output);

        // Decoders may not know their output size until the first frame is parsed.
        if let Ok((width, height)) = output.geometry() {
            self.output_width = width;
            self.output_height = height;
        }
        self.input_format = Some(input);
        self.output_format = Some(output);
        Ok(())
    }

    /// Decodes `unit` and returns the resulting frame.
    ///
    /// The frame returned by the previous call is released first.
    pub fn decode(&mut self, unit: EncodedUnit<'_>) -> Result<Frame<'_>> {
        self.release_frame();
        self.submit(unit)?;
        self.receive_frame()
    }

    /// Applies the size `unit` declares and queues its bytes to the decoder.
    pub fn submit(&mut self, unit: EncodedUnit<'_>) -> Result<()> {
        if self.decoder.is_none() {
            return Err(Error::NotInitialized);
        }
        if !self.running {
            warn!("decoder was left stopped by a failed update, restarting it");
            self.restart()?;
        }
        self.negotiate_input(unit.width, unit.height)?;
        self.submit_input(unit.data)
    }

    /// Waits for the next decoded frame and holds it until `release_frame` or the next `decode`.
    ///
    /// Fails with `Error::FrameInFlight` if the previous frame is still held.
    pub fn receive_frame(&mut self) -> Result<Frame<'_>> {
        self.drain_output()?;
        match &self.in_flight {
            Some(image) => image.frame(),
            None => Err(Error::NotInitialized),
        }
    }

    /// Returns the frame currently held, if any.
    pub fn current_frame(&self) -> Option<Result<Frame<'_>>> {
        self.in_flight.as_ref().map(InFlightImage::frame)
    }

    /// Returns the held frame to its reader. Does nothing if no frame is held.
    pub fn release_frame(&mut self) {
        self.in_flight = None;
    }

    /// Releases the decoder, frame reader and formats. Safe to call any number of times.
    ///
    /// Failures are logged and never stop the remaining resources from being released.
    pub fn teardown(&mut self) {
        self.release_frame();
        if let Some(mut decoder) = self.decoder.take() {
            if self.running {
                if let Err(e) = decoder.stop() {
                    error!("failed to stop the decoder: {:#}", e);
                }
            }
            self.running = false;
        }
        self.binding = None;
        self.input_format = None;
        self.output_format = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn resize_strategy(&self) -> ResizeStrategy {
        self.resize_strategy
    }

    /// The frame size the decoder currently expects on its input.
    pub fn input_geometry(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    /// The frame size the decoder last reported for its output.
    pub fn output_geometry(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    pub fn input_format(&self) -> Option<&FormatDescription> {
        self.input_format.as_ref()
    }

    pub fn output_format(&self) -> Option<&FormatDescription> {
        self.output_format.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<B: DecoderBackend> Drop for DecoderSession<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn deadline_restarts_on_progress() {
        let mut deadline = Deadline::new(Some(Duration::from_millis(20)));
        thread::sleep(Duration::from_millis(40));
        assert!(matches!(deadline.check(), Err(Error::Stalled(_))));

        deadline.reset();
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn deadline_without_limit_never_expires() {
        let deadline = Deadline::new(None);
        thread::sleep(Duration::from_millis(5));
        assert!(deadline.check().is_ok());
    }
}
