//! Print note messages from a hardware input device.
//!
//! Usage: `cargo run --example monitor -- [device-index] [seconds]`
//!
//! Listens for 10 seconds by default, then stops the session.

use std::thread;
use std::time::Duration;

use notestream_midi_io::{open_hardware_session, NoteState};

fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let index: usize = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
    let seconds: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(10);

    let session = match open_hardware_session(index) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    println!("Monitoring [{}] {}", session.device_index(), session.device_name());

    let listening = session.clone();
    let listen_thread = thread::spawn(move || listening.start());

    let stopper = session.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        stopper.stop();
    });

    for message in session.stream() {
        let state = match message.state {
            NoteState::On => "on ",
            NoteState::Off => "off",
        };
        println!("note {} key {:3} velocity {:3}", state, message.key, message.velocity);
    }

    if let Err(e) = listen_thread.join().unwrap() {
        eprintln!("ERROR: {}", e);
    }
    let stats = session.stats();
    println!("{} notes, {} other events ignored", stats.delivered, stats.ignored);
}
