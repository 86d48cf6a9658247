//! USB data structures for the device snapshots compared by the watch loop.
//!
//! A [`Snapshot`] is keyed by [`DeviceId`] so identity across polls is the vendor:product pair alone; bus and port topology are not tracked.
use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};
use crate::usb::{self, ClassMetadata};

/// Raw device descriptor fields as returned by an [`super::Enumerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawDescriptor {
    /// idVendor
    pub vendor_id: u16,
    /// idProduct
    pub product_id: u16,
    /// bDeviceClass
    pub device_class: u8,
}

impl RawDescriptor {
    /// New descriptor from vendor, product and class
    pub fn new(vendor_id: u16, product_id: u16, device_class: u8) -> Self {
        RawDescriptor {
            vendor_id,
            product_id,
            device_class,
        }
    }
}

/// Identity of a device across polls: vendor and product ID
///
/// Displays in the canonical lowercase form `vvvv:pppp`:
///
/// ```
/// use std::str::FromStr;
/// use usbwatch::profiler::DeviceId;
///
/// let id = DeviceId::new(0x1, 0x2a3);
/// assert_eq!(id.to_string(), "0001:02a3");
/// assert_eq!(DeviceId::from_str("0001:02A3").unwrap(), id);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct DeviceId {
    /// Vendor ID
    pub vendor_id: u16,
    /// Product ID
    pub product_id: u16,
}

impl DeviceId {
    /// New id from vendor and product
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        DeviceId {
            vendor_id,
            product_id,
        }
    }
}

impl From<&RawDescriptor> for DeviceId {
    fn from(raw: &RawDescriptor) -> Self {
        DeviceId::new(raw.vendor_id, raw.product_id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

impl FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vid, pid) = s.trim().split_once(':').ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidArg,
                &format!("'{}' is not in the form vvvv:pppp", s),
            )
        })?;

        let parse = |v: &str| -> Result<u16, Error> {
            if v.is_empty() || v.len() > 4 {
                return Err(Error::new(
                    ErrorKind::InvalidArg,
                    &format!("'{}' is not a 16 bit hex ID", v),
                ));
            }
            u16::from_str_radix(v, 16).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidArg,
                    &format!("'{}' is not a 16 bit hex ID: {}", v, e),
                )
            })
        };

        Ok(DeviceId::new(parse(vid)?, parse(pid)?))
    }
}

/// A device classified against the [`usb`] class registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Vendor:product identity
    #[serde(rename = "device_id")]
    pub id: DeviceId,
    /// bDeviceClass as reported
    pub class_code: u8,
    /// Registry metadata for `class_code`
    #[serde(flatten)]
    pub metadata: &'static ClassMetadata,
}

impl DeviceRecord {
    /// Build record from descriptor, looking up class metadata
    pub fn from_descriptor(raw: &RawDescriptor) -> Self {
        DeviceRecord {
            id: DeviceId::from(raw),
            class_code: raw.device_class,
            metadata: usb::lookup(raw.device_class),
        }
    }
}

impl From<RawDescriptor> for DeviceRecord {
    fn from(raw: RawDescriptor) -> Self {
        DeviceRecord::from_descriptor(&raw)
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {:#04x} {}",
            self.id, self.class_code, self.metadata.description
        )
    }
}

/// All devices attached at one poll instant
///
/// Read-only once built; the next poll produces a new [`Snapshot`] rather than changing this one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    devices: BTreeMap<DeviceId, DeviceRecord>,
}

impl Snapshot {
    /// Build from descriptors
    ///
    /// Descriptors sharing a [`DeviceId`] collapse into the first seen; this is logged as identity is only vendor:product.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = RawDescriptor>,
    {
        let mut devices: BTreeMap<DeviceId, DeviceRecord> = BTreeMap::new();

        for raw in descriptors {
            let record = DeviceRecord::from_descriptor(&raw);
            if let Some(existing) = devices.get(&record.id) {
                log::debug!(
                    "Duplicate device {} (class {:#04x}) collapsed into existing (class {:#04x})",
                    record.id,
                    record.class_code,
                    existing.class_code
                );
                continue;
            }
            devices.insert(record.id, record);
        }

        Snapshot { devices }
    }

    /// Number of unique devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// No devices attached
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Whether device `id` is present
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    /// Record for `id` if present
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceRecord> {
        self.devices.get(id)
    }

    /// Iterate over records, ordered by [`DeviceId`]
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }

    /// Iterate over ids, ordered
    pub fn ids(&self) -> impl Iterator<Item = &DeviceId> {
        self.devices.keys()
    }
}

impl FromIterator<RawDescriptor> for Snapshot {
    fn from_iter<I: IntoIterator<Item = RawDescriptor>>(iter: I) -> Self {
        Snapshot::from_descriptors(iter)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a DeviceRecord;
    type IntoIter = std::collections::btree_map::Values<'a, DeviceId, DeviceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.values()
    }
}
