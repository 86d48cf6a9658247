//! Watch for USB devices being connected and disconnected by polling snapshots.
//!
//! The [`Watcher`] owns the baseline [`Snapshot`]. Each cycle builds a new snapshot, reports the difference against the baseline then replaces it, whether or not anything changed.
//!
//! ```no_run
//! use usbwatch::display::TextReporter;
//! use usbwatch::profiler::{self, SnapshotBuilder};
//! use usbwatch::watch::{Shutdown, WatchSettings, Watcher};
//!
//! let builder = SnapshotBuilder::new(profiler::default_enumerator().unwrap());
//! let reporter = TextReporter::new(std::io::stdout());
//! let shutdown = Shutdown::new();
//! let mut watcher = Watcher::new(builder, reporter, WatchSettings::default());
//! watcher.run(&shutdown).unwrap();
//! ```
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::diff::{self, Changes};
use crate::display::Reporter;
use crate::error::Result;
use crate::profiler::{Enumerator, Snapshot, SnapshotBuilder};

/// Default minimum delay between polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
/// Default cap on the delay after repeated enumeration failures
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Floor for the retry delay so a zero interval does not spin on a failing backend
const MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Timing and retry policy for [`Watcher::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Upper bound of the backoff delay
    pub max_backoff: Duration,
    /// Consecutive enumeration failures before giving up; `None` retries forever
    pub max_failures: Option<u32>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        WatchSettings {
            interval: DEFAULT_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_failures: None,
        }
    }
}

impl WatchSettings {
    /// Delay before the next attempt after `failures` consecutive enumeration failures
    ///
    /// Doubles from `max(interval, 100 ms)` and is capped at `max_backoff`, but never drops below 100 ms:
    ///
    /// ```
    /// use std::time::Duration;
    /// use usbwatch::watch::WatchSettings;
    ///
    /// let settings = WatchSettings {
    ///     interval: Duration::from_millis(500),
    ///     max_backoff: Duration::from_secs(3),
    ///     max_failures: None,
    /// };
    /// assert_eq!(settings.retry_delay(1), Duration::from_millis(500));
    /// assert_eq!(settings.retry_delay(2), Duration::from_millis(1000));
    /// assert_eq!(settings.retry_delay(4), Duration::from_secs(3));
    ///
    /// let no_backoff = WatchSettings {
    ///     max_backoff: Duration::ZERO,
    ///     ..settings
    /// };
    /// assert_eq!(no_backoff.retry_delay(1), Duration::from_millis(100));
    /// ```
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let base = self.interval.max(MIN_RETRY_DELAY);
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        base.saturating_mul(factor)
            .min(self.max_backoff)
            .max(MIN_RETRY_DELAY)
    }
}

/// Shutdown signal shared between the watch loop and whatever requests the stop
///
/// Clones share state so [`Shutdown::trigger`] on any clone stops the loop at the next check.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    /// New un-triggered signal
    pub fn new() -> Self {
        Default::default()
    }

    /// Request shutdown, waking any waiter
    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`; returns early with `true` if shutdown is requested
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |stop| !*stop)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

#[derive(Debug)]
enum State {
    /// No baseline yet
    Idle,
    /// Baseline established
    Watching(Snapshot),
}

/// Drives the poll, diff, report, rebase cycle
#[derive(Debug)]
pub struct Watcher<E: Enumerator, R: Reporter> {
    builder: SnapshotBuilder<E>,
    reporter: R,
    settings: WatchSettings,
    state: State,
}

impl<E: Enumerator, R: Reporter> Watcher<E, R> {
    /// New [`Watcher`] in the idle state
    pub fn new(builder: SnapshotBuilder<E>, reporter: R, settings: WatchSettings) -> Self {
        Watcher {
            builder,
            reporter,
            settings,
            state: State::Idle,
        }
    }

    /// The snapshot changes are compared against; `None` until [`Watcher::start`]
    pub fn baseline(&self) -> Option<&Snapshot> {
        match &self.state {
            State::Idle => None,
            State::Watching(baseline) => Some(baseline),
        }
    }

    /// Whether a baseline is established
    pub fn is_watching(&self) -> bool {
        matches!(self.state, State::Watching(_))
    }

    /// The reporter events are written to
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consume returning the reporter
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Take the initial snapshot as baseline and print it as a listing
    ///
    /// Enumeration failure here is returned; there is no previous baseline to fall back on. Does nothing if already watching.
    pub fn start(&mut self) -> Result<()> {
        if self.is_watching() {
            log::debug!("Already watching, start ignored");
            return Ok(());
        }

        self.reporter.start()?;
        let snapshot = self.builder.build()?;
        log::info!("Watching with baseline of {} devices", snapshot.len());
        self.reporter.listing(&snapshot)?;
        self.state = State::Watching(snapshot);

        Ok(())
    }

    /// Run a single cycle: build, diff against baseline, report and rebase
    ///
    /// If still idle this starts instead and returns no changes. On an enumeration error the baseline is left untouched.
    pub fn poll(&mut self) -> Result<Changes> {
        if !self.is_watching() {
            self.start()?;
            return Ok(Changes::default());
        }

        let current = self.builder.build()?;
        self.apply(current)
    }

    fn apply(&mut self, current: Snapshot) -> Result<Changes> {
        let changes = match &self.state {
            State::Watching(baseline) => diff::diff(baseline, &current),
            State::Idle => Changes::default(),
        };

        if !changes.is_empty() {
            log::info!(
                "Changes detected: {} disconnected, {} connected",
                changes.disconnected.len(),
                changes.connected.len()
            );
            self.reporter.changes(&changes)?;
        }
        self.state = State::Watching(current);

        Ok(changes)
    }

    /// Start then poll until `shutdown` is triggered
    ///
    /// `shutdown` is checked between cycles while waiting the interval. Enumeration failures keep the baseline and retry with backoff per [`WatchSettings`]; any other error (output for example) is returned.
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<()> {
        self.start()?;

        let mut failures: u32 = 0;
        let mut delay = self.settings.interval;

        loop {
            if shutdown.wait_timeout(delay) {
                log::info!("Shutdown requested, stopping watch");
                return Ok(());
            }

            match self.poll() {
                Ok(_) => {
                    if failures > 0 {
                        log::info!("Device list recovered after {} failed attempts", failures);
                    }
                    failures = 0;
                    delay = self.settings.interval;
                }
                Err(e) if e.is_enumeration() => {
                    failures = failures.saturating_add(1);
                    if self
                        .settings
                        .max_failures
                        .is_some_and(|max| failures >= max)
                    {
                        log::error!("Giving up after {} failed attempts to list devices", failures);
                        return Err(e);
                    }
                    delay = self.settings.retry_delay(failures);
                    log::warn!(
                        "Failed to list devices (attempt {}), keeping last baseline and retrying in {:?}: {:#}",
                        failures,
                        delay,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
