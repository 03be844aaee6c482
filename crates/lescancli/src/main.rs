//! Command-line BLE advertisement scanner.
//!
//! Prints one line per received advertisement (`ADDR RSSI XX XX ...`), or,
//! when a target address is given, a single line with the time it took to
//! observe that address. Ctrl-C and the optional timeout both end the scan
//! through the session's shutdown path, so the radio is always left with
//! scanning disabled.

use clap::Parser;
use lescan::{BdAddr, CancelToken, HciError, HciSocket, ScanConfig, ScanOutcome, ScanSession};
use std::fmt::Write as _;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Scan for BLE advertisements over a raw HCI device
#[derive(Parser, Debug)]
#[command(name = "lescan", version, about)]
struct Args {
    /// Scan interval in 0.625 ms units
    #[arg(short = 'i', long, default_value_t = 0x0010)]
    interval: u16,

    /// Scan window in 0.625 ms units
    #[arg(short = 'w', long, default_value_t = 0x0010)]
    window: u16,

    /// Perform an active scan (default is passive)
    #[arg(short = 'a', long)]
    active: bool,

    /// Stop as soon as this address is observed and report the elapsed time
    #[arg(short = 'm', long, value_name = "ADDR")]
    target: Option<BdAddr>,

    /// Stop after this many seconds (0 = no timeout)
    #[arg(short = 't', long, default_value_t = 0)]
    timeout: u64,

    /// Stop after this many advertising events (0 = unbounded)
    #[arg(short = 'c', long, default_value_t = 0)]
    max_events: u32,

    /// Preferred HCI device index, falling back to hci0
    #[arg(short = 'd', long, default_value_t = 1)]
    device: u16,

    /// Treat the timeout as an inactivity deadline, reset on every event
    #[arg(long)]
    rearm: bool,
}

static SIGINT_HIT: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signum: libc::c_int) {
    SIGINT_HIT.store(true, Ordering::Relaxed);
}

/// Install the SIGINT handler without SA_RESTART so a pending wait is
/// interrupted instead of silently restarted.
fn install_sigint_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigint as usize;
        sa.sa_flags = 0;
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
    }
}

/// Convert 0.625 ms scan units to whole milliseconds, truncating.
fn units_to_ms(units: u16) -> u32 {
    units as u32 * 625 / 1000
}

fn run(args: Args) -> Result<(), HciError> {
    let mut config = ScanConfig::new()
        .interval(args.interval)
        .window(args.window);
    println!("interval={} ms", units_to_ms(args.interval));
    println!("window={} ms", units_to_ms(args.window));
    if args.active {
        println!("performing active scan");
        config = config.active();
    }
    if let Some(target) = args.target {
        println!("target addr: {}", target);
        config = config.target(target);
    }
    if args.timeout > 0 {
        config = config.timeout(Duration::from_secs(args.timeout));
    }
    if args.max_events > 0 {
        config = config.max_events(args.max_events);
    }
    if args.rearm {
        config = config.rearm_on_report();
    }

    let socket = HciSocket::open_preferred(args.device)?;
    println!("Using hci{}", socket.dev_id());
    let mut session = ScanSession::new(socket, config);
    session.start()?;

    let token = CancelToken::new();
    install_sigint_handler();
    {
        let token = token.clone();
        thread::spawn(move || {
            while !SIGINT_HIT.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(100));
            }
            token.cancel();
        });
    }

    let outcome = session.run(&token, |report| {
        let mut line = format!("{} {}", report.address, report.rssi);
        for byte in &report.data {
            let _ = write!(line, " {:02X}", byte);
        }
        println!("{}", line);
    })?;

    match outcome {
        ScanOutcome::TargetFound { elapsed } => {
            println!("target bdaddr found after {} ms", elapsed.as_millis());
        }
        ScanOutcome::TimedOut | ScanOutcome::Cancelled => {
            println!("Exiting..");
        }
        ScanOutcome::EventLimitReached => {}
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}
