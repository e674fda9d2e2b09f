// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Input and output size negotiation.
//!
//! The input size comes from the caller with every unit; the output size comes from the decoder,
//! after (re)configuration and whenever it reports a format change. The frame reader always
//! matches the output size.

use anyhow::Context;
use base::debug;
use base::error;
use base::info;
use base::warn;

use super::DecoderSession;
use super::FrameReaderBinding;
use crate::backend::DecoderBackend;
use crate::backend::HardwareDecoder;
use crate::config::ResizeStrategy;
use crate::error::*;
use crate::format::build_format;
use crate::format::FormatDescription;

impl<B: DecoderBackend> DecoderSession<B> {
    /// Tells the decoder about a new input size, if `width`x`height` differs from the current one.
    ///
    /// Sizes below the configured minimum are rejected before anything is changed.
    pub(super) fn negotiate_input(&mut self, width: u32, height: u32) -> Result<()> {
        if (width, height) == (self.input_width, self.input_height) {
            return Ok(());
        }
        self.config.check_dimensions(width, height)?;

        info!(
            "input size changed from {}x{} to {}x{}",
            self.input_width, self.input_height, width, height
        );
        let format = build_format(&self.config.mime, width, height, self.config.color_format);
        match self.resize_strategy {
            ResizeStrategy::SetParameters => {
                debug!("updating decoder parameters with {}", format);
                self.decoder
                    .as_mut()
                    .ok_or(Error::NotInitialized)?
                    .set_parameters(&format)
                    .context("while updating the decoder input format")?;
                self.input_format = Some(format);
            }
            ResizeStrategy::Reconfigure => self.reconfigure(format)?,
        }
        self.input_width = width;
        self.input_height = height;

        self.negotiate_output()
    }

    /// Stops the decoder and configures it again with `format`.
    ///
    /// If that fails, the decoder is brought back up at the current input size so that the session
    /// keeps decoding units of that size.
    fn reconfigure(&mut self, format: FormatDescription) -> Result<()> {
        let e = match self.configure_and_start(format) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if !self.running {
            warn!(
                "reconfiguration failed, restoring {}x{}",
                self.input_width, self.input_height
            );
            if let Err(restore) = self.restart() {
                error!("failed to restore the previous input format: {}", restore);
            }
        }
        Err(e)
    }

    /// Configures and starts a stopped decoder at the current input size.
    pub(super) fn restart(&mut self) -> Result<()> {
        let format = build_format(
            &self.config.mime,
            self.input_width,
            self.input_height,
            self.config.color_format,
        );
        self.configure_and_start(format)
    }

    fn configure_and_start(&mut self, format: FormatDescription) -> Result<()> {
        let decoder = self.decoder.as_mut().ok_or(Error::NotInitialized)?;
        let binding = self.binding.as_ref().ok_or(Error::NotInitialized)?;
        if self.running {
            decoder
                .stop()
                .context("while stopping the decoder for reconfiguration")?;
            self.running = false;
        }
        debug!("reconfiguring decoder with {}", format);
        decoder
            .configure(&format, binding.window())
            .context("while reconfiguring the decoder")?;
        self.input_format = Some(format);
        self.refresh_formats()?;

        self.decoder
            .as_mut()
            .ok_or(Error::NotInitialized)?
            .start()
            .context("while restarting the decoder")?;
        self.running = true;
        Ok(())
    }

    /// Reads the decoder's output size and rebinds the frame reader if it changed.
    pub(super) fn negotiate_output(&mut self) -> Result<()> {
        let format = self
            .decoder
            .as_ref()
            .ok_or(Error::NotInitialized)?
            .output_format()
            .context("while reading the decoder output format")?;
        debug!("output format: {}", format);
        let (width, height) = format.geometry()?;
        self.output_format = Some(format);
        self.output_width = width;
        self.output_height = height;
        self.sync_binding()
    }

    /// Makes sure the frame reader matches the last known output size.
    pub(super) fn sync_binding(&mut self) -> Result<()> {
        if self.decoder.is_none() {
            return Err(Error::NotInitialized);
        }
        let bound = self.binding.as_ref().map(|b| (b.width(), b.height()));
        if bound == Some((self.output_width, self.output_height)) {
            return Ok(());
        }
        self.rebind(self.output_width, self.output_height)
    }

    fn rebind(&mut self, width: u32, height: u32) -> Result<()> {
        info!("output size is now {}x{}, recreating the frame reader", width, height);
        // A held image belongs to the reader about to be deleted.
        self.release_frame();

        // The current reader stays attached until its replacement is.
        let binding =
            FrameReaderBinding::new(&mut self.backend, width, height, self.config.max_images)?;
        self.decoder
            .as_mut()
            .ok_or(Error::NotInitialized)?
            .set_output_window(binding.window())
            .context("while attaching the new frame reader")?;
        self.binding = Some(binding);
        self.stats.rebinds += 1;
        Ok(())
    }
}
