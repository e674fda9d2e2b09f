// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Entry points used by an H.264 codec layer that can pick between several decoding subsystems.

use base::debug;
use base::error;
use base::warn;

use crate::backend::DecoderBackend;
use crate::config::SessionConfig;
use crate::error::*;
use crate::session::DecoderSession;
use crate::session::EncodedUnit;
use crate::session::Frame;

/// Strides of the planes of the last decoded frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub row_strides: [u32; 3],
    pub pixel_strides: [u32; 3],
}

impl<'a> From<&Frame<'a>> for PlaneLayout {
    fn from(frame: &Frame<'a>) -> Self {
        PlaneLayout {
            row_strides: frame.row_strides(),
            pixel_strides: frame.pixel_strides(),
        }
    }
}

/// A decoding (and possibly encoding) implementation selectable by an `H264Context`.
pub trait H264Subsystem {
    fn name(&self) -> &'static str;

    /// Prepares the subsystem for a stream of `width`x`height` frames.
    fn init(&mut self, compressor: bool, width: u32, height: u32) -> Result<()>;

    /// Releases everything `init` created. Safe to call repeatedly or before `init`.
    fn uninit(&mut self);

    /// Decodes `unit`, keeping the decoded planes available through `yuv_data` until the next call.
    fn decompress(&mut self, unit: EncodedUnit<'_>) -> Result<PlaneLayout>;

    /// Encodes the frame held by the subsystem into `dst`, returning the encoded size.
    fn compress(&mut self, dst: &mut Vec<u8>) -> Result<usize>;

    /// Planes of the last decoded frame.
    fn yuv_data(&self) -> Option<[&[u8]; 3]>;
}

/// Caller-side state of an H.264 codec instance.
pub struct H264Context<S: H264Subsystem> {
    pub compressor: bool,
    /// Frame size declared by the bitstream, updated by the caller before each `decompress`.
    pub width: u32,
    pub height: u32,
    pub i_stride: [u32; 3],
    pub pixel_stride: [u32; 3],
    subsystem: S,
}

impl<S: H264Subsystem> H264Context<S> {
    pub fn new(subsystem: S, compressor: bool, width: u32, height: u32) -> Self {
        H264Context {
            compressor,
            width,
            height,
            i_stride: [0; 3],
            pixel_stride: [0; 3],
            subsystem,
        }
    }

    pub fn subsystem_name(&self) -> &'static str {
        self.subsystem.name()
    }

    pub fn init(&mut self) -> bool {
        match self.subsystem.init(self.compressor, self.width, self.height) {
            Ok(()) => true,
            Err(e) => {
                error!("{} initialization failed: {}", self.subsystem.name(), e);
                false
            }
        }
    }

    pub fn uninit(&mut self) {
        self.subsystem.uninit();
        self.i_stride = [0; 3];
        self.pixel_stride = [0; 3];
    }

    /// Decodes `data`. Returns 1 on success and -1 on failure.
    pub fn decompress(&mut self, data: &[u8]) -> i32 {
        let unit = EncodedUnit {
            data,
            width: self.width,
            height: self.height,
        };
        match self.subsystem.decompress(unit) {
            Ok(layout) => {
                self.i_stride = layout.row_strides;
                self.pixel_stride = layout.pixel_strides;
                1
            }
            Err(e) => {
                error!("failed to decode a {} byte unit: {}", data.len(), e);
                // The previous frame was released before decoding started.
                self.i_stride = [0; 3];
                self.pixel_stride = [0; 3];
                -1
            }
        }
    }

    /// Encodes into `dst`. Returns the encoded size, or -1 on failure.
    pub fn compress(&mut self, dst: &mut Vec<u8>) -> i32 {
        match self.subsystem.compress(dst) {
            Ok(size) => i32::try_from(size).unwrap_or(-1),
            Err(e) => {
                error!("{} cannot encode: {}", self.subsystem.name(), e);
                -1
            }
        }
    }

    /// Planes of the last decoded frame, valid until the next `decompress` or `uninit`.
    pub fn yuv_data(&self) -> Option<[&[u8]; 3]> {
        self.subsystem.yuv_data()
    }
}

/// Decoding through a platform hardware decoder.
pub struct MediaCodecSubsystem<B: DecoderBackend + Clone> {
    backend: B,
    config: SessionConfig,
    session: Option<DecoderSession<B>>,
}

impl<B: DecoderBackend + Clone> MediaCodecSubsystem<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        MediaCodecSubsystem {
            backend,
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&DecoderSession<B>> {
        self.session.as_ref()
    }
}

#[cfg(target_os = "android")]
impl MediaCodecSubsystem<crate::backend::ndk::NdkBackend> {
    /// Decoding through the device's `AMediaCodec` H.264 decoder.
    pub fn android(config: SessionConfig) -> Self {
        Self::new(crate::backend::ndk::NdkBackend::new(), config)
    }
}

impl<B: DecoderBackend + Clone> H264Subsystem for MediaCodecSubsystem<B> {
    fn name(&self) -> &'static str {
        "MediaCodec"
    }

    fn init(&mut self, compressor: bool, width: u32, height: u32) -> Result<()> {
        if compressor {
            return Err(Error::UnsupportedEncoder);
        }
        let mut config = self.config.clone();
        if config.check_dimensions(width, height).is_ok() {
            config.initial_width = Some(width);
            config.initial_height = Some(height);
        } else {
            debug!(
                "starting at {:?} instead of the unusable {}x{}",
                config.initial_dimensions(),
                width,
                height
            );
        }
        // Re-initializing replaces any previous session.
        self.session = None;
        self.session = Some(DecoderSession::new(self.backend.clone(), config)?);
        Ok(())
    }

    fn uninit(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
    }

    fn decompress(&mut self, unit: EncodedUnit<'_>) -> Result<PlaneLayout> {
        let session = self.session.as_mut().ok_or(Error::NotInitialized)?;
        let frame = session.decode(unit)?;
        Ok(PlaneLayout::from(&frame))
    }

    fn compress(&mut self, _dst: &mut Vec<u8>) -> Result<usize> {
        warn!("MediaCodec encoding is not implemented");
        Err(Error::UnsupportedEncoder)
    }

    fn yuv_data(&self) -> Option<[&[u8]; 3]> {
        match self.session.as_ref()?.current_frame()? {
            Ok(frame) => Some(frame.data()),
            Err(e) => {
                error!("failed to read the decoded planes: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;

    fn context(backend: &FakeBackend) -> H264Context<MediaCodecSubsystem<FakeBackend>> {
        let subsystem = MediaCodecSubsystem::new(backend.clone(), SessionConfig::default());
        H264Context::new(subsystem, false, 320, 240)
    }

    #[test]
    fn name() {
        assert_eq!(context(&FakeBackend::new()).subsystem_name(), "MediaCodec");
    }

    #[test]
    fn encoder_is_unsupported() {
        let backend = FakeBackend::new();
        let mut ctx = context(&backend);
        ctx.compressor = true;
        assert!(!ctx.init());
        assert_eq!(backend.live_decoders(), 0);

        let mut dst = Vec::new();
        assert_eq!(ctx.compress(&mut dst), -1);
        assert!(dst.is_empty());
    }

    #[test]
    fn decompress_before_init_fails() {
        let mut ctx = context(&FakeBackend::new());
        assert_eq!(ctx.decompress(b"unit"), -1);
        assert!(ctx.yuv_data().is_none());
    }

    #[test]
    fn decompress_fills_strides_and_planes() {
        let backend = FakeBackend::new();
        let mut ctx = context(&backend);
        assert!(ctx.init());

        assert_eq!(ctx.decompress(b"unit"), 1);
        assert_eq!(ctx.i_stride, [320, 320, 320]);
        assert_eq!(ctx.pixel_stride, [1, 2, 2]);
        let [y, u, v] = ctx.yuv_data().unwrap();
        assert_eq!(y.len(), 320 * 240);
        assert!(!u.is_empty());
        assert!(!v.is_empty());

        ctx.uninit();
        assert!(ctx.yuv_data().is_none());
        assert_eq!(ctx.i_stride, [0; 3]);
        assert_eq!(backend.live_images(), 0);
        assert_eq!(backend.live_decoders(), 0);
    }

    #[test]
    fn failed_decompress_clears_strides() {
        let backend = FakeBackend::new();
        let mut ctx = context(&backend);
        assert!(ctx.init());
        assert_eq!(ctx.decompress(b"unit"), 1);

        backend.push_output_status(-1000);
        assert_eq!(ctx.decompress(b"unit"), -1);
        assert_eq!(ctx.i_stride, [0; 3]);
        assert_eq!(ctx.pixel_stride, [0; 3]);
        assert!(ctx.yuv_data().is_none());

        assert_eq!(ctx.decompress(b"unit"), 1);
        assert_eq!(ctx.pixel_stride, [1, 2, 2]);
    }

    #[test]
    fn init_starts_at_the_context_size() {
        let backend = FakeBackend::new();
        let subsystem = MediaCodecSubsystem::new(backend.clone(), SessionConfig::default());
        let mut ctx = H264Context::new(subsystem, false, 1280, 720);
        assert!(ctx.init());
        assert_eq!(backend.configured_formats()[0].geometry().unwrap(), (1280, 720));

        // A size the decoder cannot take falls back to the configured one.
        ctx.width = 16;
        ctx.height = 16;
        assert!(ctx.init());
        let configured = backend.configured_formats();
        assert_eq!(configured[1].geometry().unwrap(), (320, 240));
        assert_eq!(backend.live_decoders(), 1);
    }

    #[test]
    fn uninit_is_repeatable() {
        let backend = FakeBackend::new();
        let mut ctx = context(&backend);
        ctx.uninit();
        assert!(ctx.init());
        ctx.uninit();
        ctx.uninit();
        assert_eq!(backend.live_readers(), 0);
        assert_eq!(backend.live_windows(), 0);
    }
}
