use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, warn};

use lockstep_shared::TransportHandle;

use crate::transport::PacketSocket;

/// Moves datagrams between a [`PacketSocket`] and a session's
/// [`TransportHandle`] on a dedicated thread. The thread stops when this
/// value is dropped.
pub struct IoThread {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl IoThread {
    pub fn spawn<S: PacketSocket + 'static>(
        socket: S,
        handle: TransportHandle,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();
        let join_handle = thread::Builder::new()
            .name("lockstep-io".to_string())
            .spawn(move || run(socket, handle, poll_interval, thread_shutdown))?;

        Ok(Self {
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|join_handle| !join_handle.is_finished())
    }
}

impl Drop for IoThread {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                warn!("I/O thread panicked");
            }
        }
    }
}

fn run<S: PacketSocket>(
    mut socket: S,
    handle: TransportHandle,
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
) {
    debug!("I/O thread started");
    while !shutdown.load(Ordering::Relaxed) {
        let mut busy = false;

        while let Some(datagram) = handle.pop_outbound() {
            busy = true;
            if let Err(error) = socket.send_to(datagram.peer_id, &datagram.bytes) {
                // the transport retries reliable packets on its own
                debug!("{}", error);
            }
        }

        loop {
            match socket.receive() {
                Ok(Some((peer_id, bytes))) => {
                    busy = true;
                    handle.push_inbound(peer_id, bytes.to_vec(), Instant::now());
                }
                Ok(None) => break,
                Err(error) => {
                    warn!("{}", error);
                    break;
                }
            }
        }

        if !busy {
            thread::sleep(poll_interval);
        }
    }
    debug!("I/O thread stopped");
}
