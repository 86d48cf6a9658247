//! Printing of device events, either as plain text blocks or newline delimited JSON
//!
//! Reporters write to any [`Write`] so the owner of the stream decides what to do with output errors; nothing here retries.
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, Write};

use crate::diff::Changes;
use crate::profiler::{DeviceRecord, Snapshot};

/// Why a device is being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Present in the initial listing
    Listed,
    /// Newly attached since the last poll
    Connected,
    /// Removed since the last poll
    Disconnected,
}

/// Output for the watch loop
pub trait Reporter {
    /// Print the banner shown before anything else
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Print heading before a batch of changes
    fn begin_changes(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Print a single device event
    fn report(&mut self, kind: EventKind, record: &DeviceRecord) -> io::Result<()>;

    /// Called once a listing or batch of changes has been reported
    fn flush(&mut self) -> io::Result<()>;

    /// Print every device in `snapshot` as [`EventKind::Listed`]
    fn listing(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        for record in snapshot {
            self.report(EventKind::Listed, record)?;
        }
        self.flush()
    }

    /// Print `changes` with all disconnections before connections
    fn changes(&mut self, changes: &Changes) -> io::Result<()> {
        self.begin_changes()?;
        for record in &changes.disconnected {
            self.report(EventKind::Disconnected, record)?;
        }
        for record in &changes.connected {
            self.report(EventKind::Connected, record)?;
        }
        self.flush()
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn start(&mut self) -> io::Result<()> {
        (**self).start()
    }

    fn begin_changes(&mut self) -> io::Result<()> {
        (**self).begin_changes()
    }

    fn report(&mut self, kind: EventKind, record: &DeviceRecord) -> io::Result<()> {
        (**self).report(kind, record)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn listing(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        (**self).listing(snapshot)
    }

    fn changes(&mut self, changes: &Changes) -> io::Result<()> {
        (**self).changes(changes)
    }
}

/// Plain text blocks
///
/// ```text
/// Device connected. DETAILS:
/// DEVICE ID = 0781:5567
/// CLASS INFO:
///     USAGE: Interface
///     DESCRIPTION: Mass storage (MSC or UMS)
///     EXAMPLE: USB flash drive, memory card reader, digital audio player, digital camera, external drive
/// ```
#[derive(Debug)]
pub struct TextReporter<W: Write> {
    writer: W,
    listed_heading: bool,
}

impl<W: Write> TextReporter<W> {
    /// New reporter writing to `writer`
    pub fn new(writer: W) -> Self {
        TextReporter {
            writer,
            listed_heading: false,
        }
    }

    /// Consume and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn start(&mut self) -> io::Result<()> {
        writeln!(self.writer, "Listening for changes...")?;
        writeln!(self.writer)
    }

    fn begin_changes(&mut self) -> io::Result<()> {
        writeln!(self.writer, "Changes detected:")?;
        writeln!(self.writer)
    }

    fn report(&mut self, kind: EventKind, record: &DeviceRecord) -> io::Result<()> {
        match kind {
            EventKind::Listed => {}
            EventKind::Connected => writeln!(self.writer, "Device connected. DETAILS:")?,
            EventKind::Disconnected => writeln!(self.writer, "Device disconnected. DETAILS:")?,
        }
        writeln!(self.writer, "DEVICE ID = {}", record.id)?;
        writeln!(self.writer, "CLASS INFO:")?;
        writeln!(self.writer, "\tUSAGE: {}", record.metadata.usage)?;
        writeln!(self.writer, "\tDESCRIPTION: {}", record.metadata.description)?;
        writeln!(self.writer, "\tEXAMPLE: {}", record.metadata.example)?;
        writeln!(self.writer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn listing(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        if !self.listed_heading {
            writeln!(self.writer, "ACTIVE DEVICES:")?;
            writeln!(self.writer)?;
            self.listed_heading = true;
        }
        if snapshot.is_empty() {
            writeln!(self.writer, "No devices attached")?;
            writeln!(self.writer)?;
        }
        for record in snapshot {
            self.report(EventKind::Listed, record)?;
        }
        self.flush()
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: EventKind,
    time: DateTime<Local>,
    device: &'a DeviceRecord,
}

/// Newline delimited JSON, one object per device event
#[derive(Debug)]
pub struct JsonReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReporter<W> {
    /// New reporter writing to `writer`
    pub fn new(writer: W) -> Self {
        JsonReporter { writer }
    }

    /// Consume and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, kind: EventKind, record: &DeviceRecord) -> io::Result<()> {
        let event = JsonEvent {
            event: kind,
            time: Local::now(),
            device: record,
        };
        serde_json::to_writer(&mut self.writer, &event)?;
        writeln!(self.writer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::profiler::RawDescriptor;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn hid() -> RawDescriptor {
        RawDescriptor::new(0x04f2, 0x0001, 0x03)
    }

    fn storage() -> RawDescriptor {
        RawDescriptor::new(0x0781, 0x5567, 0x08)
    }

    fn text(f: impl FnOnce(&mut TextReporter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut reporter = TextReporter::new(Vec::new());
        f(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_text_connected_block() {
        let record = DeviceRecord::from(hid());
        let out = text(|r| r.report(EventKind::Connected, &record));
        assert_eq!(
            out,
            "Device connected. DETAILS:\n\
             DEVICE ID = 04f2:0001\n\
             CLASS INFO:\n\
             \tUSAGE: Interface\n\
             \tDESCRIPTION: Human interface device (HID)\n\
             \tEXAMPLE: Keyboard, mouse, joystick\n\n"
        );
    }

    #[test]
    fn test_text_undefined_block() {
        let record = DeviceRecord::from(RawDescriptor::new(0x1234, 0xabcd, 0xab));
        let out = text(|r| r.report(EventKind::Disconnected, &record));
        assert!(out.starts_with("Device disconnected. DETAILS:\nDEVICE ID = 1234:abcd\n"));
        assert!(out.contains("\tUSAGE: undefined\n"));
        assert!(out.contains("\tDESCRIPTION: undefined\n"));
        assert!(out.contains("\tEXAMPLE: undefined\n"));
    }

    #[test]
    fn test_text_changes_disconnected_first() {
        let changes = diff(
            &Snapshot::from_descriptors(vec![hid()]),
            &Snapshot::from_descriptors(vec![storage()]),
        );
        let out = text(|r| r.changes(&changes));
        assert!(out.starts_with("Changes detected:\n"));
        let disconnected = out
            .find("Device disconnected. DETAILS:\nDEVICE ID = 04f2:0001")
            .unwrap();
        let connected = out
            .find("Device connected. DETAILS:\nDEVICE ID = 0781:5567")
            .unwrap();
        assert!(disconnected < connected);
    }

    #[test]
    fn test_text_listing() {
        let snapshot = Snapshot::from_descriptors(vec![storage(), hid()]);
        let out = text(|r| r.listing(&snapshot));
        assert!(out.starts_with("ACTIVE DEVICES:\n\nDEVICE ID = 04f2:0001\n"));
        assert!(out.contains("DEVICE ID = 0781:5567"));
        assert!(!out.contains("DETAILS"));
    }

    #[test]
    fn test_text_empty_listing() {
        let out = text(|r| r.listing(&Snapshot::default()));
        assert_eq!(out, "ACTIVE DEVICES:\n\nNo devices attached\n\n");
    }

    #[test]
    fn test_json_event() {
        let record = DeviceRecord::from(storage());
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(EventKind::Connected, &record).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.ends_with('\n'));

        let mut value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        let time = value.as_object_mut().unwrap().remove("time").unwrap();
        assert!(DateTime::parse_from_rfc3339(time.as_str().unwrap()).is_ok());
        assert_json_eq!(
            value,
            json!({
                "event": "connected",
                "device": {
                    "device_id": "0781:5567",
                    "class_code": 8,
                    "usage": "Interface",
                    "description": "Mass storage (MSC or UMS)",
                    "example": "USB flash drive, memory card reader, digital audio player, digital camera, external drive"
                }
            })
        );
    }

    #[test]
    fn test_json_changes_one_line_per_event() {
        let changes = diff(
            &Snapshot::from_descriptors(vec![hid()]),
            &Snapshot::from_descriptors(vec![storage()]),
        );
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.changes(&changes).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let events: Vec<String> = out
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["event"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(events, vec!["disconnected", "connected"]);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Listed.to_string(), "listed");
        assert_eq!(EventKind::Disconnected.to_string(), "disconnected");
    }
}
