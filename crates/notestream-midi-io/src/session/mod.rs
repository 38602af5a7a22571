//! Device session: one open input, one cancellable listener, one message stream.
//!
//! ## Quick Start
//!
//! ```ignore
//! use notestream_midi_io::{MidiSessionBuilder, MidirBackend};
//!
//! let session = MidiSessionBuilder::new()
//!     .device(0)
//!     .build(&MidirBackend)?;
//!
//! // start() blocks until stop(), so run it on its own thread
//! let listening = session.clone();
//! std::thread::spawn(move || listening.start());
//!
//! for message in session.stream() {
//!     println!("{:?}", message);
//! }
//! ```

mod builder;
mod listener;

pub use builder::{DeviceSelector, MidiSessionBuilder};
pub use listener::SessionStats;

use crossbeam_channel::{bounded, select_biased, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::driver::{MidiBackend, MidiDriver, MidiInputPort};
use crate::error::{Error, Result};
use crate::Message;
use notestream_midi::MidiMsg;
use listener::{Listener, ListenerCounters};

pub(crate) const DEFAULT_CLIENT_NAME: &str = "notestream";

/// Something that produces a stream of note messages until stopped.
pub trait MidiStream {
    /// Blocks until [`MidiStream::stop`] is called.
    fn start(&self) -> Result<()>;
    fn stop(&self);
    fn stream(&self) -> Receiver<Message>;
}

/// Open a session on `device_index` with default settings.
pub fn open_session<B: MidiBackend>(
    backend: &B,
    device_index: usize,
) -> Result<MidiSession<B::Driver>> {
    MidiSessionBuilder::new().device(device_index).build(backend)
}

/// One open MIDI input device delivering [`Message`]s.
///
/// Clone is cheap (Arc internally): run [`MidiSession::start`] on one clone
/// and call [`MidiSession::stop`] from another.
pub struct MidiSession<D: MidiDriver> {
    inner: Arc<SessionInner<D>>,
}

impl<D: MidiDriver> Clone for MidiSession<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub(crate) struct SessionInner<D: MidiDriver> {
    pub(crate) device_index: usize,
    pub(crate) device_name: String,
    pub(crate) driver: Mutex<Option<D>>,
    pub(crate) port: Mutex<Option<D::Port>>,
    /// Held until a listener is attached, then moved into it.
    pub(crate) sender: Mutex<Option<Sender<Message>>>,
    pub(crate) receiver: Receiver<Message>,
    /// Dropping this sender is the cancellation signal.
    pub(crate) cancel: Mutex<Option<Sender<()>>>,
    pub(crate) cancelled: Receiver<()>,
    pub(crate) listening: AtomicBool,
    pub(crate) stopped: AtomicBool,
    pub(crate) counters: Arc<ListenerCounters>,
}

impl<D: MidiDriver> MidiSession<D> {
    /// Attach the listener and block until the session is stopped or the
    /// driver drops the listener.
    ///
    /// Fails with [`Error::AlreadyListening`] if another call is active and
    /// with [`Error::SessionStopped`] after [`MidiSession::stop`]. If the
    /// driver refuses the listener, the session stays idle and `start` may be
    /// retried. If the driver drops the listener while listening (device
    /// unplugged), the stream is closed and `start` returns
    /// [`Error::DeviceDisconnected`]; the session then only accepts `stop`.
    pub fn start(&self) -> Result<()> {
        if self.inner.stopped.load(Ordering::Acquire) {
            return Err(Error::SessionStopped);
        }
        if self.inner.listening.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyListening);
        }

        let alive = match self.attach() {
            Ok(alive) => alive,
            Err(e) => {
                self.inner.listening.store(false, Ordering::Release);
                return Err(e);
            }
        };
        info!("Listening on MIDI input: {}", self.inner.device_name);

        // Neither channel ever carries a value; both only disconnect. stop()
        // cancels before it detaches the listener, so cancellation wins then.
        let driver_failed = select_biased! {
            recv(self.inner.cancelled) -> _ => false,
            recv(alive) -> _ => !self.inner.stopped.load(Ordering::Acquire),
        };

        self.inner.listening.store(false, Ordering::Release);
        if driver_failed {
            warn!("MIDI input dropped by driver: {}", self.inner.device_name);
            return Err(Error::DeviceDisconnected(self.inner.device_name.clone()));
        }
        debug!("MIDI listen loop exited: {}", self.inner.device_name);
        Ok(())
    }

    /// Returns the receiver that disconnects when the driver drops the listener.
    fn attach(&self) -> Result<Receiver<()>> {
        let sender = self.inner.sender.lock().clone().ok_or_else(|| {
            if self.inner.stopped.load(Ordering::Acquire) {
                Error::SessionStopped
            } else {
                // A previous listener was dropped by the driver and took the
                // only producer with it.
                Error::DeviceDisconnected(self.inner.device_name.clone())
            }
        })?;

        let mut port = self.inner.port.lock();
        let port = port.as_mut().ok_or(Error::SessionStopped)?;

        let (alive_token, alive) = bounded(0);
        let mut listener = Listener::new(
            sender,
            self.inner.cancelled.clone(),
            self.inner.counters.clone(),
            alive_token,
        );
        port.listen(Box::new(move |event: &MidiMsg| listener.on_event(event)))?;

        // The listener now holds the only producer.
        self.inner.sender.lock().take();
        Ok(alive)
    }

    /// Fire cancellation, stop listening, release the driver.
    ///
    /// Safe to call any number of times from any clone; only the first call
    /// does anything. Teardown failures are logged, not returned.
    pub fn stop(&self) {
        self.inner.shutdown();
    }

    /// Receive side of the message channel. Every call returns the same
    /// channel; it disconnects once the session is stopped.
    pub fn stream(&self) -> Receiver<Message> {
        self.inner.receiver.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.inner.counters.snapshot()
    }

    pub fn device_index(&self) -> usize {
        self.inner.device_index
    }

    pub fn device_name(&self) -> &str {
        &self.inner.device_name
    }

    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }
}

impl<D: MidiDriver> SessionInner<D> {
    fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        // Cancel before touching the driver: a listener blocked on a full
        // channel must let go before the driver joins its callback thread.
        drop(self.cancel.lock().take());

        if let Some(mut port) = self.port.lock().take() {
            if let Err(e) = port.stop_listening() {
                warn!("Failed to stop listening on '{}': {}", self.device_name, e);
            }
        }
        if let Some(mut driver) = self.driver.lock().take() {
            if let Err(e) = driver.close() {
                warn!("Failed to close MIDI driver: {}", e);
            }
        }

        // Never started: nobody else holds a producer, close the channel here.
        drop(self.sender.lock().take());

        info!("Stopped MIDI input: {}", self.device_name);
    }
}

impl<D: MidiDriver> Drop for SessionInner<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<D: MidiDriver> MidiStream for MidiSession<D> {
    fn start(&self) -> Result<()> {
        MidiSession::start(self)
    }

    fn stop(&self) {
        MidiSession::stop(self)
    }

    fn stream(&self) -> Receiver<Message> {
        MidiSession::stream(self)
    }
}

impl<D: MidiDriver> std::fmt::Debug for MidiSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiSession")
            .field("device_index", &self.inner.device_index)
            .field("device_name", &self.inner.device_name)
            .field("listening", &self.is_listening())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::VirtualBackend;
    use std::thread;
    use std::time::Duration;

    fn session_with_device() -> (VirtualBackend, crate::port::VirtualDevice) {
        let backend = VirtualBackend::new();
        let device = backend.add_device("Keys");
        (backend, device)
    }

    fn wait_for_listener(device: &crate::port::VirtualDevice) {
        for _ in 0..200 {
            if device.has_listener() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("listener was never attached");
    }

    #[test]
    fn test_stream_returns_same_channel() {
        let (backend, _device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();
        let a = session.stream();
        let b = session.stream();
        assert!(a.same_channel(&b));
    }

    #[test]
    fn test_stop_before_start_closes_stream() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();
        let stream = session.stream();

        session.stop();
        assert!(session.is_stopped());
        assert!(stream.recv().is_err());
        assert!(matches!(session.start(), Err(Error::SessionStopped)));
        assert!(!device.has_listener());
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let (backend, _device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();
        session.stop();
        session.stop();
        session.clone().stop();
        assert!(session.is_stopped());
    }

    #[test]
    fn test_start_blocks_until_stop() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();

        let listening = session.clone();
        let handle = thread::spawn(move || listening.start());

        wait_for_listener(&device);
        assert!(session.is_listening());
        assert!(!handle.is_finished());

        session.stop();
        assert!(handle.join().unwrap().is_ok());
        assert!(!session.is_listening());
        assert!(!device.has_listener());
    }

    #[test]
    fn test_second_start_rejected() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();

        let listening = session.clone();
        let handle = thread::spawn(move || listening.start());
        wait_for_listener(&device);

        assert!(matches!(session.start(), Err(Error::AlreadyListening)));

        session.stop();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_attach_failure_allows_retry() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();

        // Occupy the device's single listener slot.
        let mut driver = backend.create_driver("other").unwrap();
        let mut other = driver.inputs().unwrap().remove(0);
        other.open().unwrap();
        other.listen(Box::new(|_: &MidiMsg| {})).unwrap();

        assert!(matches!(session.start(), Err(Error::ListenAttach(_))));
        assert!(!session.is_listening());

        other.stop_listening().unwrap();

        let listening = session.clone();
        let handle = thread::spawn(move || listening.start());
        wait_for_listener(&device);
        session.stop();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_start_returns_when_device_unplugged() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();

        let listening = session.clone();
        let handle = thread::spawn(move || listening.start());
        wait_for_listener(&device);

        device.disconnect();
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(Error::DeviceDisconnected(ref name)) if name == "Keys"));
        assert!(!session.is_listening());
        assert!(!session.is_stopped());
        assert!(session.stream().recv().is_err());

        // The producer went away with the listener; restarting can't reopen it.
        assert!(matches!(session.start(), Err(Error::DeviceDisconnected(_))));
        assert!(!session.is_listening());

        session.stop();
        assert!(matches!(session.start(), Err(Error::SessionStopped)));
    }

    #[test]
    fn test_dropping_last_handle_releases_device() {
        let (backend, device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();
        let stream = session.stream();

        drop(session);
        assert!(stream.recv().is_err());
        assert!(!device.has_listener());
    }

    #[test]
    fn test_debug_output() {
        let (backend, _device) = session_with_device();
        let session = open_session(&backend, 0).unwrap();
        let debug = format!("{:?}", session);
        assert!(debug.contains("Keys"));
    }
}
