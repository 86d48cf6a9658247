//! Defines for USB device classes, mainly those covered at [usb.org](https://www.usb.org/defined-class-codes)
//!
//! The registry is a process-wide read-only table; [`lookup`] is total so callers never need to handle a missing class.
//!
//! ```
//! use usbwatch::usb::{self, DescriptorUsage};
//!
//! let hid = usb::lookup(0x03);
//! assert_eq!(hid.usage, DescriptorUsage::Interface);
//! assert_eq!(hid.description, "Human interface device (HID)");
//!
//! let unknown = usb::lookup(0xab);
//! assert_eq!(unknown.usage, DescriptorUsage::Undefined);
//! assert_eq!(unknown.to_string(), "undefined");
//! ```
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Explains how the class code is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum DescriptorUsage {
    /// Class is defined in the device descriptor
    Device,
    /// Class is defined in the interface descriptors
    Interface,
    /// Can be used in either
    Both,
    /// Class code not in the registry
    #[strum(serialize = "undefined")]
    #[serde(rename = "undefined")]
    Undefined,
}

/// Metadata describing a USB class code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassMetadata {
    /// Where the class code is used
    pub usage: DescriptorUsage,
    /// Human readable class name
    pub description: &'static str,
    /// Example devices of the class
    pub example: &'static str,
}

impl ClassMetadata {
    const fn new(
        usage: DescriptorUsage,
        description: &'static str,
        example: &'static str,
    ) -> ClassMetadata {
        ClassMetadata {
            usage,
            description,
            example,
        }
    }

    /// Whether this is the [`UNDEFINED`] metadata of an unregistered class
    pub fn is_undefined(&self) -> bool {
        self.usage == DescriptorUsage::Undefined
    }
}

impl fmt::Display for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Metadata for any class code not in the registry
pub static UNDEFINED: ClassMetadata =
    ClassMetadata::new(DescriptorUsage::Undefined, "undefined", "undefined");

use DescriptorUsage::{Both, Device, Interface};

#[rustfmt::skip]
const CLASS_CODES: [(u8, ClassMetadata); 21] = [
    (0x00, ClassMetadata::new(Device, "Unspecified", "Device class is unspecified, interface descriptors are used to determine needed drivers")),
    (0x01, ClassMetadata::new(Interface, "Audio", "Speaker, microphone, sound card, MIDI")),
    (0x02, ClassMetadata::new(Both, "Communications and CDC control", "UART and RS-232 serial adapter, Modem, Wi-Fi adapter, Ethernet adapter. Used together with class 0Ah (CDC-Data) below")),
    (0x03, ClassMetadata::new(Interface, "Human interface device (HID)", "Keyboard, mouse, joystick")),
    (0x05, ClassMetadata::new(Interface, "Physical interface device (PID)", "Force feedback joystick")),
    (0x06, ClassMetadata::new(Interface, "Image (PTP/MTP)", "Webcam, scanner")),
    (0x07, ClassMetadata::new(Interface, "Printer", "Laser printer, inkjet printer, CNC machine")),
    (0x08, ClassMetadata::new(Interface, "Mass storage (MSC or UMS)", "USB flash drive, memory card reader, digital audio player, digital camera, external drive")),
    (0x09, ClassMetadata::new(Device, "USB hub", "Full bandwidth hub")),
    (0x0a, ClassMetadata::new(Interface, "CDC-Data", "Used together with class 02h (Communications and CDC Control) above")),
    (0x0b, ClassMetadata::new(Interface, "Smart Card", "USB smart card reader")),
    (0x0d, ClassMetadata::new(Interface, "Content security", "Fingerprint reader")),
    (0x0e, ClassMetadata::new(Interface, "Video", "Webcam")),
    (0x0f, ClassMetadata::new(Interface, "Personal healthcare device class (PHDC)", "Pulse monitor (watch)")),
    (0x10, ClassMetadata::new(Interface, "Audio/Video (AV)", "Webcam, TV")),
    (0x11, ClassMetadata::new(Device, "Billboard", "Describes USB-C alternate modes supported by device")),
    (0xdc, ClassMetadata::new(Both, "Diagnostic device", "USB compliance testing device")),
    (0xe0, ClassMetadata::new(Interface, "Wireless Controller", "Bluetooth adapter, Microsoft RNDIS")),
    (0xef, ClassMetadata::new(Both, "Miscellaneous", "ActiveSync device")),
    (0xfe, ClassMetadata::new(Interface, "Application-specific", "IrDA Bridge, Test & Measurement Class (USBTMC), USB DFU (Device Firmware Upgrade)")),
    (0xff, ClassMetadata::new(Both, "Vendor-specific", "Indicates that a device needs vendor-specific drivers")),
];

lazy_static! {
    static ref REGISTRY: HashMap<u8, ClassMetadata> = CLASS_CODES.iter().cloned().collect();
}

/// Metadata for `class_code` if it is a registered class
pub fn get(class_code: u8) -> Option<&'static ClassMetadata> {
    REGISTRY.get(&class_code)
}

/// Metadata for `class_code`, [`UNDEFINED`] if it is not registered
pub fn lookup(class_code: u8) -> &'static ClassMetadata {
    get(class_code).unwrap_or(&UNDEFINED)
}

/// All registered class codes in ascending order
pub fn known_codes() -> Vec<u8> {
    let mut codes: Vec<u8> = REGISTRY.keys().copied().collect();
    codes.sort_unstable();
    codes
}
