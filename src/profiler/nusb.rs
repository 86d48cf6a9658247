//! Uses nusb (pure Rust) to list system USB devices. Requires 'nusb' feature.
use super::*;
use crate::error::{Error, ErrorKind};
use ::nusb;

/// [`Enumerator`] backed by [`nusb::list_devices`]
#[derive(Debug, Default)]
pub struct NusbEnumerator;

/// nusb errors are [`std::io::Error`] so cannot use `From` without clashing with the Io kind
fn map_nusb_error(error: nusb::Error) -> Error {
    let kind = match error.kind() {
        std::io::ErrorKind::PermissionDenied => ErrorKind::Opening,
        std::io::ErrorKind::Unsupported => ErrorKind::Unsupported,
        _ => ErrorKind::Nusb,
    };
    Error::new(
        kind,
        &format!("Failed to list system USB devices with nusb: Error({})", error),
    )
}

impl From<&nusb::DeviceInfo> for RawDescriptor {
    fn from(device: &nusb::DeviceInfo) -> Self {
        RawDescriptor::new(device.vendor_id(), device.product_id(), device.class())
    }
}

impl Enumerator for NusbEnumerator {
    fn list_devices(&mut self) -> Result<Vec<RawDescriptor>> {
        let devices = nusb::list_devices().map_err(map_nusb_error)?;
        Ok(devices.map(|d| RawDescriptor::from(&d)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_permission_denied() {
        let e = map_nusb_error(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(e.kind(), ErrorKind::Opening);
        assert!(e.is_enumeration());
    }

    #[test]
    fn test_map_other() {
        let e = map_nusb_error(std::io::Error::new(std::io::ErrorKind::Other, "sysfs"));
        assert_eq!(e.kind(), ErrorKind::Nusb);
    }

    /// Requires a host USB subsystem so only run with physical devices
    #[test]
    #[ignore]
    fn test_list_devices() {
        let mut enumerator = NusbEnumerator;
        enumerator.list_devices().unwrap();
    }
}
