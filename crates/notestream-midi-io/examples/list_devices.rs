use notestream_midi_io::{list_devices, MidirBackend};

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== MIDI Input Devices ===");
    let devices = match list_devices(&MidirBackend) {
        Ok(devices) => devices,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    if devices.is_empty() {
        println!("  (none found)");
    }
    for dev in &devices {
        println!("  [{}] {}", dev.index, dev.name);
    }
}
