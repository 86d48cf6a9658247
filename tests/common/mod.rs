//! Scripted enumerator and output helpers for driving the watch loop without USB hardware
#![allow(dead_code)]
use std::collections::VecDeque;
use std::process;

use usbwatch::error::{Error, ErrorKind, Result};
use usbwatch::profiler::{Enumerator, RawDescriptor};
use usbwatch::watch::Shutdown;

/// Chicony keyboard, HID
pub const KEYBOARD: RawDescriptor = RawDescriptor {
    vendor_id: 0x04f2,
    product_id: 0x0001,
    device_class: 0x03,
};
/// SanDisk flash drive, mass storage
pub const FLASH_DRIVE: RawDescriptor = RawDescriptor {
    vendor_id: 0x0781,
    product_id: 0x5567,
    device_class: 0x08,
};
/// Linux Foundation 2.0 root hub
pub const ROOT_HUB: RawDescriptor = RawDescriptor {
    vendor_id: 0x1d6b,
    product_id: 0x0002,
    device_class: 0x09,
};
/// Device with a class not in the registry
pub const MYSTERY: RawDescriptor = RawDescriptor {
    vendor_id: 0x1234,
    product_id: 0xabcd,
    device_class: 0xab,
};

/// One scripted result of [`Enumerator::list_devices`]
#[derive(Debug, Clone)]
pub enum Poll {
    /// Devices attached
    Devices(Vec<RawDescriptor>),
    /// Backend could not list devices
    Fail(ErrorKind),
}

/// [`Enumerator`] returning a script of polls; once exhausted it triggers `shutdown` and keeps returning the last devices listed
#[derive(Debug)]
pub struct ScriptedEnumerator {
    polls: VecDeque<Poll>,
    last: Vec<RawDescriptor>,
    shutdown: Shutdown,
    pub calls: usize,
}

impl ScriptedEnumerator {
    pub fn new(polls: Vec<Poll>, shutdown: &Shutdown) -> Self {
        ScriptedEnumerator {
            polls: polls.into(),
            last: Vec::new(),
            shutdown: shutdown.clone(),
            calls: 0,
        }
    }
}

impl Enumerator for ScriptedEnumerator {
    fn list_devices(&mut self) -> Result<Vec<RawDescriptor>> {
        self.calls += 1;
        match self.polls.pop_front() {
            Some(Poll::Devices(devices)) => {
                self.last = devices;
                Ok(self.last.clone())
            }
            Some(Poll::Fail(kind)) => Err(Error::new(kind, "scripted failure")),
            None => {
                self.shutdown.trigger();
                Ok(self.last.clone())
            }
        }
    }
}

/// Assert text output matches, showing a line diff if not
pub fn assert_output(expected: &str, actual: &str) {
    if expected != actual {
        let diff_text = diff::lines(expected, actual)
            .into_iter()
            .map(|diff| match diff {
                diff::Result::Left(l) => format!("-{}", l),
                diff::Result::Both(l, _) => format!(" {}", l),
                diff::Result::Right(r) => format!("+{}", r),
            })
            .collect::<Vec<_>>()
            .join("\n");

        panic!(
            "Output did not match.\nShowing diff between expected and actual:\n{}\n",
            diff_text
        );
    }
}

/// Run the *usbwatch* binary with `args`
pub fn run_usbwatch(args: &[&str]) -> process::Output {
    process::Command::new(env!("CARGO_BIN_EXE_usbwatch"))
        .args(args)
        .output()
        .expect("usbwatch output")
}
