//! System USB profiler for building [`Snapshot`]s of attached devices
//!
//! The [`Enumerator`] trait is the seam to the platform USB subsystem; the backend used by [`default_enumerator`] depends on the feature enabled, either `nusb` or `libusb`. See the submodules [`nusb`] and [`libusb`].
//!
//! ```no_run
//! use usbwatch::profiler::{self, SnapshotBuilder};
//!
//! let mut builder = SnapshotBuilder::new(profiler::default_enumerator().unwrap());
//! let snapshot = builder.build().unwrap();
//! for device in snapshot.iter() {
//!     println!("{}", device);
//! }
//! ```
use crate::error::Result;

// separate module but import all
pub mod types;
pub use types::*;

#[cfg(feature = "libusb")]
pub mod libusb;
#[cfg(feature = "nusb")]
pub mod nusb;

/// Lists the raw descriptors of devices currently attached to the host
///
/// An `Err` means the device list could not be read at all (backend unavailable, permission denied) and is distinct from `Ok` with no devices.
pub trait Enumerator: std::fmt::Debug {
    /// Get a descriptor for each attached device; order is not meaningful
    fn list_devices(&mut self) -> Result<Vec<RawDescriptor>>;
}

impl<E: Enumerator + ?Sized> Enumerator for Box<E> {
    fn list_devices(&mut self) -> Result<Vec<RawDescriptor>> {
        (**self).list_devices()
    }
}

/// Builds a [`Snapshot`] from an [`Enumerator`]
#[derive(Debug)]
pub struct SnapshotBuilder<E: Enumerator> {
    enumerator: E,
}

impl<E: Enumerator> SnapshotBuilder<E> {
    /// New builder using `enumerator`
    pub fn new(enumerator: E) -> Self {
        SnapshotBuilder { enumerator }
    }

    /// Query the enumerator and classify each device
    ///
    /// Enumerator errors are returned as is, never as an empty [`Snapshot`].
    pub fn build(&mut self) -> Result<Snapshot> {
        let descriptors = self.enumerator.list_devices()?;
        log::trace!(
            "{:?} listed {} devices: {:?}",
            self.enumerator,
            descriptors.len(),
            descriptors
        );
        let snapshot = Snapshot::from_descriptors(descriptors);
        log::debug!("Built snapshot of {} devices", snapshot.len());

        Ok(snapshot)
    }

    /// Reference to the underlying enumerator
    pub fn enumerator(&self) -> &E {
        &self.enumerator
    }
}

/// Get the [`Enumerator`] for the enabled backend; `nusb` is preferred if both are enabled
pub fn default_enumerator() -> Result<Box<dyn Enumerator>> {
    #[cfg(feature = "nusb")]
    {
        Ok(Box::new(nusb::NusbEnumerator))
    }
    #[cfg(all(feature = "libusb", not(feature = "nusb")))]
    {
        Ok(Box::new(libusb::LibUsbEnumerator))
    }
    #[cfg(all(not(feature = "libusb"), not(feature = "nusb")))]
    {
        Err(crate::error::Error::new(
            crate::error::ErrorKind::Unsupported,
            "nusb or libusb feature is required to do this, install with `cargo install --features nusb/libusb`",
        ))
    }
}
