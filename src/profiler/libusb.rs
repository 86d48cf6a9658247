//! Lists system USB devices through libusb using rusb. Requires the `libusb` feature.
use super::*;
use crate::error::{Error, ErrorKind};
use rusb as libusb;

/// [`Enumerator`] backed by the libusb device list
#[derive(Debug, Default)]
pub struct LibUsbEnumerator;

/// Set log level for rusb
pub fn set_log_level(debug: u8) {
    let log_level = match debug {
        0 => rusb::LogLevel::None,
        1 => rusb::LogLevel::Warning,
        2 => rusb::LogLevel::Info,
        _ => rusb::LogLevel::Debug,
    };

    rusb::set_log_level(log_level);
}

impl From<libusb::Error> for Error {
    fn from(error: libusb::Error) -> Self {
        let kind = match error {
            libusb::Error::Access => ErrorKind::Opening,
            libusb::Error::NotSupported => ErrorKind::Unsupported,
            _ => ErrorKind::LibUSB,
        };
        Error {
            kind,
            message: format!(
                "Failed to gather system USB data from libusb: Error({})",
                &error.to_string()
            ),
        }
    }
}

impl From<&libusb::DeviceDescriptor> for RawDescriptor {
    fn from(desc: &libusb::DeviceDescriptor) -> Self {
        RawDescriptor::new(desc.vendor_id(), desc.product_id(), desc.class_code())
    }
}

impl Enumerator for LibUsbEnumerator {
    fn list_devices(&mut self) -> Result<Vec<RawDescriptor>> {
        let mut descriptors = Vec::new();
        for device in libusb::devices()?.iter() {
            // libusb caches the device descriptor so this only fails if the device went away mid-list
            match device.device_descriptor() {
                Ok(desc) => descriptors.push(RawDescriptor::from(&desc)),
                Err(e) => log::warn!(
                    "Failed to get device descriptor for bus {} address {}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                ),
            }
        }

        Ok(descriptors)
    }
}
