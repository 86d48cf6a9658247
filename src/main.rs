//! Where the magic happens for `usbwatch` binary!
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use usbwatch::config::Config;
use usbwatch::display::{JsonReporter, Reporter, TextReporter};
use usbwatch::error::Result;
use usbwatch::profiler::{self, SnapshotBuilder};
use usbwatch::watch::{Shutdown, Watcher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, max_term_width = 80)]
struct Args {
    /// Path to user config file to use; default is usbwatch/usbwatch.json in the platform config dir if it exists
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum delay between polls in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Cap on the retry delay after failed polls in milliseconds
    #[arg(long)]
    max_backoff: Option<u64>,

    /// Consecutive failed polls before exiting; default retries forever
    #[arg(long)]
    max_failures: Option<u32>,

    /// Print newline delimited JSON events rather than text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print the attached devices once and exit
    #[arg(short, long, default_value_t = false)]
    list: bool,

    /// Turn debugging information on. Alternatively can use RUST_LOG env: INFO, DEBUG, TRACE
    #[arg(short = 'z', long, action = clap::ArgAction::Count)]
    debug: u8,
}

/// Merge command line arguments over the config
fn merge_config(config: &mut Config, args: &Args) {
    if args.interval.is_some() {
        config.interval_ms = args.interval;
    }
    if args.max_backoff.is_some() {
        config.max_backoff_ms = args.max_backoff;
    }
    if args.max_failures.is_some() {
        config.max_failures = args.max_failures;
    }
    config.json |= args.json;
}

/// Exit code used when a second Ctrl+C forces exit, as a shell reports SIGINT
const FORCED_EXIT_CODE: i32 = 130;

/// Handle one Ctrl+C: the first requests `shutdown`; returns `true` if shutdown was already requested so the process should exit now
fn handle_ctrl_c(shutdown: &Shutdown) -> bool {
    if shutdown.is_triggered() {
        return true;
    }
    log::info!("Ctrl+C received, stopping after the current poll. Ctrl+C again to exit now");
    shutdown.trigger();
    false
}

/// Trigger `shutdown` on Ctrl+C and exit on a second one; once installed SIGINT no longer kills the process so the loop can stop cleanly
fn spawn_ctrl_c(shutdown: Shutdown) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::spawn(move || {
        rt.block_on(async {
            while tokio::signal::ctrl_c().await.is_ok() {
                if handle_ctrl_c(&shutdown) {
                    log::warn!(
                        "Second Ctrl+C received, exiting without waiting for the USB backend"
                    );
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        })
    });

    Ok(())
}

fn run(args: Args) -> Result<()> {
    usbwatch::set_log_level(args.debug)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_default_path(),
    };
    merge_config(&mut config, &args);
    log::debug!("Using config {:?}", config);

    let settings = config.watch_settings();
    if settings.interval == Duration::ZERO {
        log::warn!("Poll interval is zero, usbwatch will poll as fast as the USB backend allows");
    }

    let stdout = io::stdout();
    let mut reporter: Box<dyn Reporter> = if config.json {
        Box::new(JsonReporter::new(stdout.lock()))
    } else {
        Box::new(TextReporter::new(stdout.lock()))
    };
    let mut builder = SnapshotBuilder::new(profiler::default_enumerator()?);

    if args.list {
        let snapshot = builder.build()?;
        reporter.listing(&snapshot)?;
        return Ok(());
    }

    let shutdown = Shutdown::new();
    spawn_ctrl_c(shutdown.clone())?;

    let mut watcher = Watcher::new(builder, reporter, settings);
    watcher.run(&shutdown)
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(_) => (),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_merge_config_args_override() {
        let mut config = Config::example();
        let args = Args::parse_from(["usbwatch", "--interval", "20", "--json"]);
        merge_config(&mut config, &args);
        assert_eq!(config.interval_ms, Some(20));
        assert_eq!(config.max_backoff_ms, Config::example().max_backoff_ms);
        assert!(config.json);
    }

    #[test]
    fn test_second_ctrl_c_forces_exit() {
        let shutdown = Shutdown::new();
        assert!(!handle_ctrl_c(&shutdown));
        assert!(shutdown.is_triggered());
        assert!(handle_ctrl_c(&shutdown));
        assert!(handle_ctrl_c(&shutdown.clone()));
    }

    #[test]
    fn test_debug_count() {
        let args = Args::parse_from(["usbwatch", "-zz", "--list"]);
        assert_eq!(args.debug, 2);
        assert!(args.list);
    }
}
