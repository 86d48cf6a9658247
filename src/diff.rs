//! Compare two [`Snapshot`]s to find connected and disconnected devices
//!
//! Only the [`DeviceId`] sets are compared: a device present in both with a different class code is unchanged.
//!
//! ```
//! use usbwatch::diff::diff;
//! use usbwatch::profiler::{RawDescriptor, Snapshot};
//!
//! let a = RawDescriptor::new(0x04f2, 0x0001, 0x03);
//! let b = RawDescriptor::new(0x0781, 0x5567, 0x08);
//! let previous = Snapshot::from_descriptors(vec![a]);
//! let current = Snapshot::from_descriptors(vec![a, b]);
//!
//! let changes = diff(&previous, &current);
//! assert_eq!(changes.connected.len(), 1);
//! assert!(changes.disconnected.is_empty());
//! assert!(diff(&current, &current).is_empty());
//! ```
use serde::Serialize;

use crate::profiler::{DeviceId, DeviceRecord, Snapshot};

/// Devices which differ between two snapshots, each ordered by [`DeviceId`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Changes {
    /// In current but not previous; records from current
    pub connected: Vec<DeviceRecord>,
    /// In previous but not current; records from previous
    pub disconnected: Vec<DeviceRecord>,
}

impl Changes {
    /// Nothing connected or disconnected
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty() && self.disconnected.is_empty()
    }

    /// Total number of events
    pub fn len(&self) -> usize {
        self.connected.len() + self.disconnected.len()
    }

    /// Ids of connected devices
    pub fn connected_ids(&self) -> Vec<DeviceId> {
        self.connected.iter().map(|r| r.id).collect()
    }

    /// Ids of disconnected devices
    pub fn disconnected_ids(&self) -> Vec<DeviceId> {
        self.disconnected.iter().map(|r| r.id).collect()
    }
}

/// Records in `a` whose id is not in `b`
fn difference(a: &Snapshot, b: &Snapshot) -> Vec<DeviceRecord> {
    a.iter().filter(|r| !b.contains(&r.id)).cloned().collect()
}

/// Symmetric difference of `previous` and `current` split into connected and disconnected
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Changes {
    Changes {
        connected: difference(current, previous),
        disconnected: difference(previous, current),
    }
}
