//! Frame reassembly from per-universe ArtDMX payloads.
//!
//! The network thread calls [`FrameAssembler::ingest`] for every decoded
//! datagram; the bridge loop blocks in [`FrameAssembler::wait_for_frame`]
//! and then drains the state with [`FrameAssembler::take_frame`]. All state
//! lives behind one mutex, and a condition variable carries the
//! "frame complete" signal.
//!
//! Completion is counted by cardinality: the frame is complete once
//! `num_universes` distinct in-range universes have been stored. Re-sending
//! a universe before completion overwrites its payload without advancing
//! the count.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::MatrixLayout;
use crate::frame::{Frame, Pixel};
use crate::protocols::opc::layout::BYTES_PER_PIXEL;

#[derive(Debug)]
struct ReassemblyState {
    universes: Vec<Option<Vec<u8>>>,
    received: usize,
    complete: bool,
    frames_completed: u64,
}

#[derive(Debug)]
pub struct FrameAssembler {
    layout: MatrixLayout,
    state: Mutex<ReassemblyState>,
    ready: Condvar,
}

impl FrameAssembler {
    pub fn new(layout: MatrixLayout) -> Self {
        Self {
            layout,
            state: Mutex::new(ReassemblyState {
                universes: vec![None; layout.num_universes()],
                received: 0,
                complete: false,
                frames_completed: 0,
            }),
            ready: Condvar::new(),
        }
    }

    pub fn layout(&self) -> &MatrixLayout {
        &self.layout
    }

    fn lock(&self) -> MutexGuard<'_, ReassemblyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores the latest payload for `universe`, replacing any earlier one.
    ///
    /// Returns `false` when the universe is outside the layout and the
    /// payload was dropped.
    pub fn ingest(&self, universe: u16, payload: &[u8]) -> bool {
        let index = universe as usize;
        if index >= self.layout.num_universes() {
            return false;
        }
        let data = &payload[..payload.len().min(self.layout.universe_bytes())];

        let mut state = self.lock();
        let is_new = state.universes[index].replace(data.to_vec()).is_none();
        if is_new {
            state.received += 1;
        }
        if state.received >= self.layout.num_universes() && !state.complete {
            state.complete = true;
            log::trace!("frame complete after universe {universe}");
            self.ready.notify_one();
        }
        true
    }

    /// Blocks until a complete frame is available or `timeout` elapses.
    ///
    /// Returns `true` when a frame is ready to take.
    pub fn wait_for_frame(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |state| !state.complete)
            .unwrap_or_else(|e| e.into_inner());
        state.complete
    }

    /// Builds a frame from the stored universes in ascending order and
    /// resets the reassembly state.
    ///
    /// Missing universes contribute no pixels; the frame is padded with
    /// black (or truncated) to the layout's pixel count.
    pub fn take_frame(&self) -> Frame {
        let mut state = self.lock();
        let mut pixels = Vec::with_capacity(self.layout.num_pixels());
        for slot in state.universes.iter_mut() {
            let Some(data) = slot.take() else {
                continue;
            };
            pixels.extend(
                data.chunks_exact(BYTES_PER_PIXEL)
                    .take(self.layout.leds_per_universe())
                    .map(|rgb| Pixel::new(rgb[0], rgb[1], rgb[2])),
            );
        }
        state.received = 0;
        state.complete = false;
        state.frames_completed += 1;
        drop(state);

        Frame::from_pixels(pixels, self.layout.num_pixels())
    }

    /// Number of frames handed out by [`take_frame`](Self::take_frame).
    pub fn frames_completed(&self) -> u64 {
        self.lock().frames_completed
    }

    /// Distinct universes stored since the last taken frame.
    pub fn universes_pending(&self) -> usize {
        self.lock().received
    }
}
