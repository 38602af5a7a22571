//! In-process MIDI devices.
//!
//! Virtual devices behave like hardware inputs from a session's point of
//! view, but events are injected programmatically (sequencers, tests, demos).

mod virtual_device;

pub use virtual_device::{VirtualBackend, VirtualDevice, VirtualDriver, VirtualInputPort};
