//! Per-event delivery: normalize, then race cancellation against the send.

use crossbeam_channel::{select_biased, Receiver, Sender};
use notestream_midi::{normalize, MidiMsg};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Listener counters, readable from any thread.
#[derive(Debug, Default)]
pub(crate) struct ListenerCounters {
    delivered: AtomicU64,
    ignored: AtomicU64,
}

impl ListenerCounters {
    pub(crate) fn snapshot(&self) -> SessionStats {
        SessionStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of what a session's listener has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages handed to the consumer.
    pub delivered: u64,
    /// Raw events that were not note-on/note-off.
    pub ignored: u64,
}

/// State moved into the driver's event handler.
///
/// Holds the only producer of the session channel. Dropping the producer
/// (on cancellation, or when the driver drops the handler) closes the channel.
/// `alive` disconnects only when the driver drops the handler.
pub(crate) struct Listener {
    sender: Option<Sender<crate::Message>>,
    cancelled: Receiver<()>,
    counters: Arc<ListenerCounters>,
    _alive: Sender<()>,
}

impl Listener {
    pub(crate) fn new(
        sender: Sender<crate::Message>,
        cancelled: Receiver<()>,
        counters: Arc<ListenerCounters>,
        alive: Sender<()>,
    ) -> Self {
        Self {
            sender: Some(sender),
            cancelled,
            counters,
            _alive: alive,
        }
    }

    pub(crate) fn on_event(&mut self, event: &MidiMsg) {
        let Some(message) = normalize(event) else {
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            trace!("Ignoring MIDI event: {:?}", event);
            return;
        };

        let Some(sender) = self.sender.as_ref() else {
            return;
        };

        // One atomic choice per event. Cancellation is listed first so it wins
        // when both are ready.
        let close = select_biased! {
            recv(self.cancelled) -> _ => {
                debug!("MIDI session cancelled, closing message stream");
                true
            }
            send(sender, message) -> res => match res {
                Ok(()) => {
                    self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                    false
                }
                Err(_) => {
                    debug!("MIDI message consumer is gone, closing message stream");
                    true
                }
            },
        };

        if close {
            self.sender = None;
        }
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.sender.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use crossbeam_channel::{bounded, TryRecvError};
    use notestream_midi::raw;

    fn listener(capacity: usize) -> (Listener, crossbeam_channel::Receiver<Message>, Sender<()>) {
        let (tx, rx) = bounded(capacity);
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let (alive_tx, _alive_rx) = bounded::<()>(0);
        let listener = Listener::new(
            tx,
            cancel_rx,
            Arc::new(ListenerCounters::default()),
            alive_tx,
        );
        (listener, rx, cancel_tx)
    }

    #[test]
    fn test_delivers_notes_in_order() {
        let (mut listener, rx, _cancel) = listener(8);

        listener.on_event(&raw::note_on(0, 60, 100));
        listener.on_event(&raw::note_off(0, 60, 0));

        assert_eq!(rx.try_recv().unwrap(), Message::note_on(60, 100));
        assert_eq!(rx.try_recv().unwrap(), Message::note_off(60));
        assert_eq!(listener.counters.snapshot().delivered, 2);
    }

    #[test]
    fn test_ignored_events_are_counted() {
        let (mut listener, rx, _cancel) = listener(8);

        listener.on_event(&raw::control_change(0, 1, 64));
        listener.on_event(&raw::pitch_bend(0, 0));

        assert!(rx.try_recv().is_err());
        assert_eq!(
            listener.counters.snapshot(),
            SessionStats {
                delivered: 0,
                ignored: 2
            }
        );
    }

    #[test]
    fn test_cancellation_wins_over_ready_send() {
        // Plenty of room in the channel, but cancellation already fired.
        let (mut listener, rx, cancel) = listener(8);
        drop(cancel);

        listener.on_event(&raw::note_on(0, 60, 100));

        assert!(listener.is_closed());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_no_delivery_after_close() {
        let (mut listener, rx, cancel) = listener(8);
        listener.on_event(&raw::note_on(0, 60, 100));
        drop(cancel);
        listener.on_event(&raw::note_on(0, 62, 100));
        listener.on_event(&raw::note_on(0, 64, 100));

        assert_eq!(rx.recv().unwrap(), Message::note_on(60, 100));
        assert!(rx.recv().is_err());
        assert_eq!(listener.counters.snapshot().delivered, 1);
    }

    #[test]
    fn test_blocked_send_released_by_cancellation() {
        // Rendezvous channel with no reader: the send can only complete if
        // cancellation fires.
        let (mut listener, rx, cancel) = listener(0);

        let handle = std::thread::spawn(move || {
            listener.on_event(&raw::note_on(0, 60, 100));
            listener
        });

        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(cancel);

        let listener = handle.join().unwrap();
        assert!(listener.is_closed());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_dropping_listener_signals_alive_token() {
        let (tx, _rx) = bounded::<Message>(1);
        let (_cancel_tx, cancel_rx) = bounded::<()>(0);
        let (alive_tx, alive_rx) = bounded::<()>(0);
        let listener = Listener::new(
            tx,
            cancel_rx,
            Arc::new(ListenerCounters::default()),
            alive_tx,
        );

        assert_eq!(alive_rx.try_recv(), Err(TryRecvError::Empty));
        drop(listener);
        assert_eq!(alive_rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_consumer_gone_closes() {
        let (mut listener, rx, _cancel) = listener(1);
        drop(rx);
        listener.on_event(&raw::note_on(0, 60, 100));
        assert!(listener.is_closed());
    }
}
