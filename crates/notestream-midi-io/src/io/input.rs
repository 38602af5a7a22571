//! midir-backed driver.
//!
//! Each driver owns a `MidiInput` client for enumeration. midir consumes a
//! client when connecting, so every opened port creates its own client and
//! gets it back when the connection closes.

use midir::{MidiInput, MidiInputConnection};
use notestream_midi::raw;
use tracing::debug;

use crate::driver::{EventHandler, MidiBackend, MidiDriver, MidiInputPort};
use crate::error::{Error, Result};

/// Backend for the platform MIDI system (ALSA, CoreMIDI, WinMM, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct MidirBackend;

impl MidiBackend for MidirBackend {
    type Driver = MidirDriver;

    fn create_driver(&self, client_name: &str) -> Result<MidirDriver> {
        let input = MidiInput::new(client_name)?;
        debug!("Created MIDI input client '{}'", client_name);
        Ok(MidirDriver {
            client_name: client_name.to_string(),
            input: Some(input),
        })
    }
}

pub struct MidirDriver {
    client_name: String,
    input: Option<MidiInput>,
}

impl MidiDriver for MidirDriver {
    type Port = MidirInputPort;

    fn inputs(&mut self) -> Result<Vec<MidirInputPort>> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::Enumeration("MIDI driver is closed".to_string()))?;

        let ports = input
            .ports()
            .into_iter()
            .enumerate()
            .map(|(index, port)| {
                let name = input
                    .port_name(&port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                MidirInputPort {
                    client_name: self.client_name.clone(),
                    name,
                    port,
                    client: None,
                    connection: None,
                }
            })
            .collect();
        Ok(ports)
    }

    fn close(&mut self) -> Result<()> {
        if self.input.take().is_some() {
            debug!("Closed MIDI input client '{}'", self.client_name);
        }
        Ok(())
    }
}

pub struct MidirInputPort {
    client_name: String,
    name: String,
    port: midir::MidiInputPort,
    client: Option<MidiInput>,
    connection: Option<MidiInputConnection<()>>,
}

impl MidiInputPort for MidirInputPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        if self.client.is_some() || self.connection.is_some() {
            return Ok(());
        }

        let client = MidiInput::new(&self.client_name)
            .map_err(|e| Error::DeviceOpen(format!("{}: {}", self.name, e)))?;

        // The port handle goes stale when the device is unplugged.
        client.port_name(&self.port).map_err(|_| {
            Error::DeviceOpen(format!("MIDI device '{}' is no longer available", self.name))
        })?;

        self.client = Some(client);
        Ok(())
    }

    fn listen(&mut self, mut handler: EventHandler) -> Result<()> {
        if self.connection.is_some() {
            return Err(Error::ListenAttach(format!(
                "already listening on '{}'",
                self.name
            )));
        }
        self.open()
            .map_err(|e| Error::ListenAttach(e.to_string()))?;
        let client = self
            .client
            .take()
            .ok_or_else(|| Error::ListenAttach(format!("'{}' is not open", self.name)))?;

        let connection_name = format!("{}-input", self.client_name);
        let device_name = self.name.clone();
        let result = client.connect(
            &self.port,
            &connection_name,
            move |_timestamp, bytes, _| match raw::parse(bytes) {
                Ok(event) => handler(&event),
                Err(e) => {
                    debug!("Failed to parse MIDI data from '{}': {:?}", device_name, e);
                }
            },
            (),
        );

        match result {
            Ok(connection) => {
                self.connection = Some(connection);
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to connect to '{}': {}", self.name, e);
                self.client = Some(e.into_inner());
                Err(Error::ListenAttach(message))
            }
        }
    }

    fn stop_listening(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            // Closing drops the handler and hands the client back.
            let (client, ()) = connection.close();
            self.client = Some(client);
            debug!("Stopped listening on '{}'", self.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::list_devices;

    #[test]
    fn test_list_devices() {
        // Device availability depends on the system; this only checks that
        // enumeration doesn't panic. CI machines often have no MIDI backend.
        match list_devices(&MidirBackend) {
            Ok(devices) => {
                for (i, device) in devices.iter().enumerate() {
                    assert_eq!(device.index, i);
                }
            }
            Err(e) => println!("No MIDI backend available: {}", e),
        }
    }
}
