//! MIDI output through `midir`.

use anyhow::{anyhow, Result};
use midir::{MidiOutput, MidiOutputConnection};
use physics_core::{DeviceId, MidiMessage, MidiSection, MidiSink, NullSink, SendError};

const CLIENT_NAME: &str = "midi-physics";
const DRY_RUN_DEVICE: &str = "dry-run";

/// Sink writing to one connected output port.
pub struct MidirSink {
    conn: MidiOutputConnection,
    name: String,
}

impl MidiSink for MidirSink {
    fn send(&mut self, msg: &MidiMessage) -> Result<(), SendError> {
        self.conn
            .send(&msg.to_bytes())
            .map_err(|e| SendError::Transmit {
                device: self.name.clone(),
                reason: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.name.clone()
    }

    fn device(&self) -> DeviceId {
        DeviceId::new(self.name.as_str())
    }
}

/// Logs instead of transmitting.
#[derive(Debug, Default)]
pub struct DryRunSink {
    sent: usize,
}

impl MidiSink for DryRunSink {
    fn send(&mut self, msg: &MidiMessage) -> Result<(), SendError> {
        let [status, a, b] = msg.to_bytes();
        log::debug!(
            "[midi] ch{} {:?} = {} ({:02X} {:02X} {:02X})",
            msg.channel.number(),
            msg.target,
            msg.value,
            status,
            a,
            b
        );
        self.sent += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Dry run ({} sent)", self.sent)
    }

    fn device(&self) -> DeviceId {
        DeviceId::new(DRY_RUN_DEVICE)
    }
}

pub fn port_names() -> Result<Vec<String>> {
    let out = MidiOutput::new(CLIENT_NAME)?;
    Ok(out
        .ports()
        .iter()
        .map(|p| out.port_name(p).unwrap_or_else(|_| "<unnamed>".to_string()))
        .collect())
}

/// Port index for a selector: a number is an index, anything else a
/// case-insensitive name fragment.
pub fn select_port(names: &[String], selector: &str) -> Option<usize> {
    if let Ok(index) = selector.trim().parse::<usize>() {
        return (index < names.len()).then_some(index);
    }
    let needle = selector.trim().to_lowercase();
    names.iter().position(|n| n.to_lowercase().contains(&needle))
}

pub fn connect(selector: Option<&str>) -> Result<MidirSink> {
    let out = MidiOutput::new(CLIENT_NAME)?;
    let ports = out.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| out.port_name(p).unwrap_or_default())
        .collect();
    let index = match selector {
        Some(sel) => select_port(&names, sel)
            .ok_or_else(|| anyhow!("no MIDI output matches `{sel}` (have {names:?})"))?,
        None if names.is_empty() => return Err(anyhow!("no MIDI output ports")),
        None => 0,
    };
    let name = names[index].clone();
    let conn = out
        .connect(&ports[index], "physics-out")
        .map_err(|e| anyhow!("connecting to {name}: {e}"))?;
    log::info!("[midi] connected to {}", name);
    Ok(MidirSink { conn, name })
}

/// Output sink for the configured device. Connection problems are not fatal:
/// the simulation runs against a sink that reports `NotConnected`.
pub fn open_sink(midi: &MidiSection, dry_run: bool) -> Box<dyn MidiSink> {
    if dry_run {
        log::info!("[midi] dry run, nothing is transmitted");
        return Box::new(DryRunSink::default());
    }
    match connect(midi.device.as_deref()) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            log::warn!("[midi] {e}; running without output");
            Box::new(NullSink)
        }
    }
}
