//! Art-Net UDP listener.
//!
//! The listener owns the socket and a named receive thread that decodes
//! every datagram and feeds the shared [`FrameAssembler`]. The socket has a
//! short read timeout so the thread notices a stop request promptly; errors
//! seen after a stop was requested are treated as shutdown noise.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use thiserror::Error;

use crate::assembler::FrameAssembler;
use crate::config::ListenerConfig;
use crate::protocols::artnet::{decode_artdmx, layout};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind Art-Net socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn receive thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Datagram counters shared with the receive thread.
#[derive(Debug, Default)]
pub struct ListenerStats {
    datagrams: AtomicU64,
    ignored: AtomicU64,
}

impl ListenerStats {
    pub fn datagrams(&self) -> u64 {
        self.datagrams.load(Ordering::Relaxed)
    }

    pub fn ignored(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }
}

pub struct NetworkListener {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    stats: Arc<ListenerStats>,
    handle: Option<JoinHandle<()>>,
}

impl NetworkListener {
    /// Binds the socket and starts the receive thread.
    pub fn start(
        config: &ListenerConfig,
        assembler: Arc<FrameAssembler>,
    ) -> Result<Self, ListenerError> {
        let socket = bind_socket(config).map_err(|source| ListenerError::Bind {
            addr: config.bind_addr,
            source,
        })?;
        let local_addr = socket.local_addr().map_err(|source| ListenerError::Bind {
            addr: config.bind_addr,
            source,
        })?;

        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(ListenerStats::default());
        let handle = {
            let running = Arc::clone(&running);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("artnet-rx".to_string())
                .spawn(move || receive_loop(socket, assembler, running, stats))
                .map_err(ListenerError::Spawn)?
        };

        log::info!("Art-Net receiver started on {local_addr}");
        Ok(Self {
            local_addr,
            running,
            stats,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the receive thread and closes the socket.
    ///
    /// Returns once the thread has exited; no datagram is ingested after
    /// this call returns. Calling `stop` again is a no-op.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Art-Net receive thread panicked");
            }
            log::info!("Art-Net receiver stopped");
        }
    }
}

impl Drop for NetworkListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bind_socket(config: &ListenerConfig) -> io::Result<UdpSocket> {
    let socket = Socket::new(
        Domain::for_address(config.bind_addr),
        Type::DGRAM,
        Some(Protocol::UDP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    socket.bind(&SockAddr::from(config.bind_addr))?;

    let socket: UdpSocket = socket.into();
    socket.set_read_timeout(Some(config.poll_interval))?;
    Ok(socket)
}

fn receive_loop(
    socket: UdpSocket,
    assembler: Arc<FrameAssembler>,
    running: Arc<AtomicBool>,
    stats: Arc<ListenerStats>,
) {
    let num_universes = assembler.layout().num_universes();
    let mut buffer = [0u8; layout::MAX_DATAGRAM_LEN];

    while running.load(Ordering::SeqCst) {
        let (len, _src) = match socket.recv_from(&mut buffer) {
            Ok(result) => result,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    log::warn!("Art-Net receive error: {e}");
                }
                continue;
            }
        };

        // A stop request may have arrived while this datagram was in flight.
        if !running.load(Ordering::SeqCst) {
            break;
        }

        stats.datagrams.fetch_add(1, Ordering::Relaxed);
        match decode_artdmx(&buffer[..len], num_universes) {
            Some(dmx) => {
                log::trace!(
                    "ArtDMX universe {} seq {:?} ({} bytes)",
                    dmx.universe,
                    dmx.sequence,
                    dmx.data.len()
                );
                assembler.ingest(dmx.universe, dmx.data);
            }
            None => {
                stats.ignored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
