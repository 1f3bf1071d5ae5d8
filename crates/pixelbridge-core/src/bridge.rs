//! Main bridge loop: Art-Net frames in, OPC frames out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::assembler::FrameAssembler;
use crate::config::BridgeConfig;
use crate::listener::NetworkListener;
use crate::serial::SerialTransmitter;

/// Counters reported when the bridge stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    pub frames_bridged: u64,
    pub frames_assembled: u64,
    pub send_failures: u64,
    pub datagrams_received: u64,
    pub datagrams_ignored: u64,
}

/// Owns the listener and transmitter once both have started.
pub struct Bridge {
    config: BridgeConfig,
    assembler: Arc<FrameAssembler>,
    listener: NetworkListener,
    transmitter: SerialTransmitter,
}

impl Bridge {
    pub fn new(
        config: BridgeConfig,
        assembler: Arc<FrameAssembler>,
        listener: NetworkListener,
        transmitter: SerialTransmitter,
    ) -> Self {
        Self {
            config,
            assembler,
            listener,
            transmitter,
        }
    }

    /// Forwards frames until `running` is cleared, then shuts down.
    ///
    /// The frame wait times out regularly so a cleared flag is noticed
    /// within `frame_timeout`. Send failures are counted and the loop
    /// carries on with the next frame; the serial link is not reopened.
    /// A status line is logged every `status_interval`, idle or not.
    pub fn run(mut self, running: &AtomicBool) -> BridgeSummary {
        let mut summary = BridgeSummary::default();
        let mut last_status = Instant::now();

        log::info!("Bridge active - waiting for Art-Net data...");
        while running.load(Ordering::SeqCst) {
            if self.assembler.wait_for_frame(self.config.frame_timeout) {
                let frame = self.assembler.take_frame();
                if self.transmitter.send(&frame) {
                    summary.frames_bridged += 1;
                } else {
                    summary.send_failures += 1;
                }
            }

            if last_status.elapsed() >= self.config.status_interval {
                self.log_status(&summary);
                last_status = Instant::now();
            }
        }

        log::info!("Stopping bridge...");
        self.shutdown();
        summary.frames_assembled = self.assembler.frames_completed();
        summary.datagrams_received = self.listener.stats().datagrams();
        summary.datagrams_ignored = self.listener.stats().ignored();
        summary
    }

    fn log_status(&self, summary: &BridgeSummary) {
        let stats = self.listener.stats();
        log::info!(
            "Frames bridged: {} (Art-Net: {}, datagrams: {}, ignored: {})",
            summary.frames_bridged,
            self.assembler.frames_completed(),
            stats.datagrams(),
            stats.ignored()
        );
        if summary.send_failures > 0 {
            log::warn!(
                "Serial send failures: {} (link: {})",
                summary.send_failures,
                self.transmitter.port_name().unwrap_or("disconnected")
            );
        }
    }

    /// Stops the listener, blanks the display and closes the port.
    ///
    /// Each step runs even if the previous one failed.
    fn shutdown(&mut self) {
        self.listener.stop();
        if !self.transmitter.send_blank() {
            log::warn!("Could not blank the display");
        }
        self.transmitter.disconnect();
    }
}
