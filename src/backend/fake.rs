// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! In-process backend emulating a hardware decoder and its frame reader.
//!
//! The fake decoder produces one frame per batch of queued input, rendered into whichever reader
//! window is attached to it. Tests keep a clone of the `FakeBackend` handed to the session to
//! script output statuses, inject failures and inspect the resources alive at any time.

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;

use super::DecoderBackend;
use super::FrameReader;
use super::HardwareDecoder;
use super::Plane;
use super::ReaderImage;
use crate::format::FormatDescription;
use crate::format::COLOR_FORMAT_YUV420_FLEXIBLE;
use crate::format::MIME_AVC;

const DEFAULT_INPUT_CAPACITY: usize = 64 * 1024;
const ROW_ALIGNMENT: u32 = 64;

/// Backend call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    AcquireImage,
    Configure,
    CreateDecoder,
    CreateReader,
    InputBuffer,
    OutputFormat,
    QueueInput,
    ReleaseOutput,
    SetOutputWindow,
    SetParameters,
    Start,
    Stop,
    Window,
}

struct ReaderState {
    width: u32,
    height: u32,
    max_images: u32,
    acquired: u32,
    // Sequence numbers of frames rendered into the reader's window.
    rendered: VecDeque<u64>,
}

struct State {
    failures: HashSet<FailPoint>,
    one_shot_failures: HashSet<FailPoint>,
    input_capacity: usize,
    input_delay: usize,
    image_delay: usize,
    output_script: VecDeque<isize>,
    output_size: Option<(u32, u32)>,
    hide_output_geometry: bool,

    current_input: FormatDescription,
    configured: Vec<FormatDescription>,
    parameter_updates: Vec<FormatDescription>,
    running: bool,
    starts: usize,
    stops: usize,
    pending_input: bool,
    chunks: Vec<Vec<u8>>,
    output_window: Option<u64>,
    frames_rendered: u64,

    next_reader_id: u64,
    readers: HashMap<u64, ReaderState>,
    readers_created: usize,
    live_windows: usize,
    live_images: usize,
    live_decoders: usize,
}

impl State {
    fn check(&mut self, point: FailPoint) -> Result<()> {
        if self.failures.contains(&point) || self.one_shot_failures.remove(&point) {
            bail!("injected failure at {:?}", point);
        }
        Ok(())
    }

    fn output_geometry(&self) -> Option<(u32, u32)> {
        self.output_size.or_else(|| self.current_input.geometry().ok())
    }
}

fn align(value: u32) -> u32 {
    (value + ROW_ALIGNMENT - 1) / ROW_ALIGNMENT * ROW_ALIGNMENT
}

/// Backend creating `FakeDecoder`s and `FakeFrameReader`s sharing one emulated device.
#[derive(Clone)]
pub struct FakeBackend {
    state: Rc<RefCell<State>>,
    set_parameters: bool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend {
            state: Rc::new(RefCell::new(State {
                failures: HashSet::new(),
                one_shot_failures: HashSet::new(),
                input_capacity: DEFAULT_INPUT_CAPACITY,
                input_delay: 0,
                image_delay: 0,
                output_script: VecDeque::new(),
                output_size: None,
                hide_output_geometry: false,
                current_input: FormatDescription::default(),
                configured: Vec::new(),
                parameter_updates: Vec::new(),
                running: false,
                starts: 0,
                stops: 0,
                pending_input: false,
                chunks: Vec::new(),
                output_window: None,
                frames_rendered: 0,
                next_reader_id: 1,
                readers: HashMap::new(),
                readers_created: 0,
                live_windows: 0,
                live_images: 0,
                live_decoders: 0,
            })),
            set_parameters: true,
        }
    }

    /// Emulates a device too old to update a running decoder in place.
    pub fn without_set_parameters(mut self) -> Self {
        self.set_parameters = false;
        self
    }

    pub fn fail_at(&self, point: FailPoint) {
        self.state.borrow_mut().failures.insert(point);
    }

    /// Makes only the next call at `point` fail.
    pub fn fail_once(&self, point: FailPoint) {
        self.state.borrow_mut().one_shot_failures.insert(point);
    }

    pub fn clear_failure(&self, point: FailPoint) {
        let mut state = self.state.borrow_mut();
        state.failures.remove(&point);
        state.one_shot_failures.remove(&point);
    }

    /// Sets the size of every input buffer handed out from now on.
    pub fn set_input_capacity(&self, capacity: usize) {
        self.state.borrow_mut().input_capacity = capacity;
    }

    /// Makes the next `count` input buffer requests report that none is available.
    pub fn delay_input(&self, count: usize) {
        self.state.borrow_mut().input_delay = count;
    }

    /// Makes the next `count` image acquisitions find nothing rendered yet.
    pub fn delay_images(&self, count: usize) {
        self.state.borrow_mut().image_delay = count;
    }

    /// Queues a raw status to be returned by the next output dequeue, ahead of any frame.
    pub fn push_output_status(&self, raw: isize) {
        self.state.borrow_mut().output_script.push_back(raw);
    }

    /// Makes the decoder report `width`x`height` as its output size instead of following its
    /// input format.
    pub fn set_output_size(&self, width: u32, height: u32) {
        self.state.borrow_mut().output_size = Some((width, height));
    }

    /// Makes reported output formats omit their width and height.
    pub fn hide_output_geometry(&self) {
        self.state.borrow_mut().hide_output_geometry = true;
    }

    /// Payloads of every input buffer queued so far, in order.
    pub fn queued_chunks(&self) -> Vec<Vec<u8>> {
        self.state.borrow().chunks.clone()
    }

    pub fn clear_queued_chunks(&self) {
        self.state.borrow_mut().chunks.clear();
    }

    pub fn configured_formats(&self) -> Vec<FormatDescription> {
        self.state.borrow().configured.clone()
    }

    pub fn parameter_updates(&self) -> Vec<FormatDescription> {
        self.state.borrow().parameter_updates.clone()
    }

    /// Id of the reader whose window the decoder currently renders into.
    pub fn output_window(&self) -> Option<u64> {
        self.state.borrow().output_window
    }

    pub fn readers_created(&self) -> usize {
        self.state.borrow().readers_created
    }

    pub fn live_readers(&self) -> usize {
        self.state.borrow().readers.len()
    }

    pub fn live_windows(&self) -> usize {
        self.state.borrow().live_windows
    }

    pub fn live_images(&self) -> usize {
        self.state.borrow().live_images
    }

    pub fn live_decoders(&self) -> usize {
        self.state.borrow().live_decoders
    }

    pub fn decoder_starts(&self) -> usize {
        self.state.borrow().starts
    }

    pub fn decoder_stops(&self) -> usize {
        self.state.borrow().stops
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }
}

impl DecoderBackend for FakeBackend {
    type Window = FakeWindow;
    type Decoder = FakeDecoder;
    type Reader = FakeFrameReader;

    fn create_decoder(&mut self, mime: &str) -> Result<FakeDecoder> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::CreateDecoder)?;
        if mime != MIME_AVC {
            bail!("no decoder for {}", mime);
        }
        state.live_decoders += 1;
        Ok(FakeDecoder {
            buffer: Vec::new(),
            dequeued: None,
            state: self.state.clone(),
        })
    }

    fn create_frame_reader(
        &mut self,
        width: u32,
        height: u32,
        max_images: u32,
    ) -> Result<FakeFrameReader> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::CreateReader)?;
        let id = state.next_reader_id;
        state.next_reader_id += 1;
        state.readers_created += 1;
        state.readers.insert(
            id,
            ReaderState {
                width,
                height,
                max_images,
                acquired: 0,
                rendered: VecDeque::new(),
            },
        );
        Ok(FakeFrameReader {
            id,
            width,
            height,
            state: self.state.clone(),
        })
    }

    fn supports_set_parameters(&self) -> bool {
        self.set_parameters
    }
}

/// Reference to the window of the `FakeFrameReader` with id `reader_id`.
pub struct FakeWindow {
    reader_id: u64,
    state: Rc<RefCell<State>>,
}

impl FakeWindow {
    pub fn reader_id(&self) -> u64 {
        self.reader_id
    }
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.state.borrow_mut().live_windows -= 1;
    }
}

pub struct FakeDecoder {
    buffer: Vec<u8>,
    dequeued: Option<usize>,
    state: Rc<RefCell<State>>,
}

impl HardwareDecoder for FakeDecoder {
    type Window = FakeWindow;

    fn name(&self) -> Result<String> {
        Ok("c2.fake.avc.decoder".to_owned())
    }

    fn configure(&mut self, format: &FormatDescription, window: &FakeWindow) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::Configure)?;
        if state.running {
            bail!("configure called on a running decoder");
        }
        state.configured.push(format.clone());
        state.current_input = format.clone();
        state.output_window = Some(window.reader_id);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::Start)?;
        state.running = true;
        state.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.stops += 1;
        state.check(FailPoint::Stop)?;
        state.running = false;
        state.pending_input = false;
        self.dequeued = None;
        Ok(())
    }

    fn set_parameters(&mut self, format: &FormatDescription) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::SetParameters)?;
        state.parameter_updates.push(format.clone());
        state.current_input = format.clone();
        Ok(())
    }

    fn set_output_window(&mut self, window: &FakeWindow) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::SetOutputWindow)?;
        state.output_window = Some(window.reader_id);
        Ok(())
    }

    fn input_format(&self) -> Result<FormatDescription> {
        Ok(self.state.borrow().current_input.clone())
    }

    fn output_format(&self) -> Result<FormatDescription> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::OutputFormat)?;
        let mut format = FormatDescription {
            mime: state.current_input.mime.clone(),
            color_format: Some(COLOR_FORMAT_YUV420_FLEXIBLE),
            ..Default::default()
        };
        if state.hide_output_geometry {
            return Ok(format);
        }
        if let Some((width, height)) = state.output_geometry() {
            format.width = i32::try_from(width).ok();
            format.height = i32::try_from(height).ok();
            format.stride = i32::try_from(align(width)).ok();
            format.slice_height = format.height;
        }
        Ok(format)
    }

    fn dequeue_input_buffer(&mut self, _timeout_us: i64) -> isize {
        let mut state = self.state.borrow_mut();
        if !state.running || self.dequeued.is_some() {
            return -1;
        }
        if state.input_delay > 0 {
            state.input_delay -= 1;
            return -1;
        }
        self.dequeued = Some(0);
        0
    }

    fn input_buffer(&mut self, index: usize) -> Result<&mut [u8]> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::InputBuffer)?;
        if self.dequeued != Some(index) {
            bail!("input buffer {} was not dequeued", index);
        }
        self.buffer.clear();
        self.buffer.resize(state.input_capacity, 0);
        Ok(self.buffer.as_mut_slice())
    }

    fn queue_input_buffer(&mut self, index: usize, size: usize) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::QueueInput)?;
        if self.dequeued != Some(index) {
            bail!("input buffer {} was not dequeued", index);
        }
        let chunk = self.buffer.get(..size).ok_or_else(|| {
            anyhow!("queued {} bytes from a {} byte buffer", size, self.buffer.len())
        })?;
        state.chunks.push(chunk.to_vec());
        state.pending_input = true;
        self.dequeued = None;
        Ok(())
    }

    fn dequeue_output_buffer(&mut self, _timeout_us: i64) -> isize {
        let mut state = self.state.borrow_mut();
        if !state.running {
            // AMEDIA_ERROR_INVALID_OPERATION
            return -10005;
        }
        if let Some(raw) = state.output_script.pop_front() {
            return raw;
        }
        if state.pending_input {
            state.pending_input = false;
            return 0;
        }
        -1
    }

    fn release_output_buffer(&mut self, index: usize, render: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::ReleaseOutput)?;
        if index != 0 {
            bail!("output buffer {} is not owned by the client", index);
        }
        if !render {
            return Ok(());
        }
        state.frames_rendered += 1;
        let sequence = state.frames_rendered;
        if let Some(id) = state.output_window {
            if let Some(reader) = state.readers.get_mut(&id) {
                reader.rendered.push_back(sequence);
            }
        }
        Ok(())
    }
}

impl Drop for FakeDecoder {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.live_decoders -= 1;
        state.running = false;
        state.pending_input = false;
        state.output_window = None;
    }
}

pub struct FakeFrameReader {
    id: u64,
    width: u32,
    height: u32,
    state: Rc<RefCell<State>>,
}

impl FakeFrameReader {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl FrameReader for FakeFrameReader {
    type Window = FakeWindow;
    type Image = FakeImage;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn window(&self) -> Result<FakeWindow> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::Window)?;
        state.live_windows += 1;
        Ok(FakeWindow {
            reader_id: self.id,
            state: self.state.clone(),
        })
    }

    fn acquire_next_image(&mut self) -> Result<Option<FakeImage>> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::AcquireImage)?;
        if state.image_delay > 0 {
            state.image_delay -= 1;
            return Ok(None);
        }
        let reader = state
            .readers
            .get_mut(&self.id)
            .ok_or_else(|| anyhow!("reader {} was deleted", self.id))?;
        if reader.rendered.is_empty() {
            return Ok(None);
        }
        if reader.acquired >= reader.max_images {
            bail!("reader {} already has {} images acquired", self.id, reader.acquired);
        }
        let sequence = reader.rendered.pop_front().unwrap_or_default();
        reader.acquired += 1;
        let image = FakeImage::new(
            self.id,
            reader.width,
            reader.height,
            sequence,
            self.state.clone(),
        );
        state.live_images += 1;
        Ok(Some(image))
    }
}

impl Drop for FakeFrameReader {
    fn drop(&mut self) {
        self.state.borrow_mut().readers.remove(&self.id);
    }
}

/// A semi-planar YUV 4:2:0 image whose luma samples all hold the frame's sequence number.
pub struct FakeImage {
    reader_id: u64,
    sequence: u64,
    planes: [(Vec<u8>, u32, u32); 3],
    state: Rc<RefCell<State>>,
}

impl FakeImage {
    fn new(
        reader_id: u64,
        width: u32,
        height: u32,
        sequence: u64,
        state: Rc<RefCell<State>>,
    ) -> Self {
        let row_stride = align(width);
        let luma_len = (row_stride * height) as usize;
        // Interleaved chroma: each plane view stops one byte short of the shared buffer's end.
        let chroma_len = ((row_stride * (height / 2)) as usize).saturating_sub(1);
        FakeImage {
            reader_id,
            sequence,
            planes: [
                (vec![sequence as u8; luma_len], row_stride, 1),
                (vec![0x80; chroma_len], row_stride, 2),
                (vec![0x80; chroma_len], row_stride, 2),
            ],
            state,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl ReaderImage for FakeImage {
    fn num_planes(&self) -> Result<usize> {
        Ok(self.planes.len())
    }

    fn plane(&self, index: usize) -> Result<Plane<'_>> {
        let (data, row_stride, pixel_stride) = self
            .planes
            .get(index)
            .ok_or_else(|| anyhow!("image has no plane {}", index))?;
        Ok(Plane {
            data,
            row_stride: *row_stride,
            pixel_stride: *pixel_stride,
        })
    }
}

impl Drop for FakeImage {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.live_images -= 1;
        if let Some(reader) = state.readers.get_mut(&self.reader_id) {
            reader.acquired -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::build_format;

    #[test]
    fn renders_one_frame_per_batch_of_input() {
        let mut backend = FakeBackend::new();
        let mut decoder = backend.create_decoder(MIME_AVC).unwrap();
        let reader = backend.create_frame_reader(320, 240, 2).unwrap();
        let window = reader.window().unwrap();
        let format = build_format(MIME_AVC, 320, 240, COLOR_FORMAT_YUV420_FLEXIBLE);
        decoder.configure(&format, &window).unwrap();
        decoder.start().unwrap();

        assert_eq!(decoder.dequeue_output_buffer(0), -1);
        let index = decoder.dequeue_input_buffer(0);
        assert_eq!(index, 0);
        decoder.input_buffer(0).unwrap()[..3].copy_from_slice(b"abc");
        decoder.queue_input_buffer(0, 3).unwrap();
        assert_eq!(backend.queued_chunks(), vec![b"abc".to_vec()]);

        assert_eq!(decoder.dequeue_output_buffer(0), 0);
        assert_eq!(decoder.dequeue_output_buffer(0), -1);
        decoder.release_output_buffer(0, true).unwrap();

        let mut reader = reader;
        let image = reader.acquire_next_image().unwrap().unwrap();
        assert_eq!(image.sequence(), 1);
        assert_eq!(image.plane(0).unwrap().row_stride, 320);
        assert_eq!(backend.live_images(), 1);
        drop(image);
        assert_eq!(backend.live_images(), 0);
        assert!(reader.acquire_next_image().unwrap().is_none());
    }

    #[test]
    fn output_format_follows_input() {
        let mut backend = FakeBackend::new();
        let mut decoder = backend.create_decoder(MIME_AVC).unwrap();
        let reader = backend.create_frame_reader(320, 240, 2).unwrap();
        let window = reader.window().unwrap();
        let format = build_format(MIME_AVC, 640, 480, COLOR_FORMAT_YUV420_FLEXIBLE);
        decoder.configure(&format, &window).unwrap();
        assert_eq!(decoder.output_format().unwrap().geometry().unwrap(), (640, 480));

        backend.set_output_size(1920, 1088);
        let format = decoder.output_format().unwrap();
        assert_eq!(format.geometry().unwrap(), (1920, 1088));
        assert_eq!(format.stride, Some(1920));

        backend.hide_output_geometry();
        assert!(decoder.output_format().unwrap().geometry().is_err());
    }

    #[test]
    fn rejects_unknown_mime() {
        let mut backend = FakeBackend::new();
        assert!(backend.create_decoder("video/hevc").is_err());
        assert_eq!(backend.live_decoders(), 0);
    }
}
