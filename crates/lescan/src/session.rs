//! The scan session: startup command sequence, read/decode loop, and the
//! single shutdown path.
//!
//! A [`ScanSession`] owns its transport for the session's lifetime. The
//! handle is either open and scanning or gone; every exit path funnels
//! through [`ScanSession::shutdown`], which disables scanning (best effort)
//! before the handle is dropped, exactly once.

use crate::cancel::{CancelToken, StopCause};
use crate::error::HciError;
use crate::hci::command::HciCommand;
use crate::hci::constants::*;
use crate::hci::event::{AdvReports, AdvertisingReport};
use crate::transport::HciTransport;
use crate::types::{BdAddr, ScanType};
use log::{info, warn};
use std::time::{Duration, Instant};

/// Round-trip bound for every control command.
const COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Upper bound on one blocking read, so a signalled cancellation token is
/// observed promptly.
const READ_SLICE: Duration = Duration::from_millis(250);

/// Immutable configuration for one scan session.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub scan_type: ScanType,
    /// Scan interval in 0.625 ms units. Zero is passed through and rejected
    /// by the controller.
    pub interval: u16,
    /// Scan window in 0.625 ms units.
    pub window: u16,
    /// Stop as soon as a report from this address is seen.
    pub target: Option<BdAddr>,
    /// End the session after this much time without a match. `None` scans
    /// until cancelled.
    pub timeout: Option<Duration>,
    /// Stop after this many meta-events that carried at least one report.
    /// `None` is unbounded. Counted per event, not per report.
    pub max_events: Option<u32>,
    /// Treat `timeout` as an inactivity deadline, re-armed on every
    /// report-bearing event.
    pub rearm_on_report: bool,
}

/// Default interval/window: 10 ms in 0.625 ms units.
pub const SCAN_INTERVAL_DEFAULT: u16 = 0x0010;
pub const SCAN_WINDOW_DEFAULT: u16 = 0x0010;

impl ScanConfig {
    pub fn new() -> Self {
        ScanConfig {
            interval: SCAN_INTERVAL_DEFAULT,
            window: SCAN_WINDOW_DEFAULT,
            ..Default::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.scan_type = ScanType::Active;
        self
    }

    pub fn interval(mut self, units: u16) -> Self {
        self.interval = units;
        self
    }

    pub fn window(mut self, units: u16) -> Self {
        self.window = units;
        self
    }

    pub fn target(mut self, addr: BdAddr) -> Self {
        self.target = Some(addr);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_events(mut self, count: u32) -> Self {
        self.max_events = Some(count);
        self
    }

    pub fn rearm_on_report(mut self) -> Self {
        self.rearm_on_report = true;
        self
    }
}

/// How a scan session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The configured target address was observed; `elapsed` is measured
    /// from scan-enable to the matching report.
    TargetFound { elapsed: Duration },
    /// The configured number of report-bearing events was reached.
    EventLimitReached,
    /// The deadline elapsed without a terminating condition.
    TimedOut,
    /// An external cancellation request ended the session.
    Cancelled,
}

impl From<StopCause> for ScanOutcome {
    fn from(cause: StopCause) -> Self {
        match cause {
            StopCause::DeadlineExpired => ScanOutcome::TimedOut,
            StopCause::Cancelled => ScanOutcome::Cancelled,
        }
    }
}

/// One scan session over an HCI transport.
pub struct ScanSession<T: HciTransport> {
    transport: Option<T>,
    config: ScanConfig,
    started_at: Instant,
    events_seen: u32,
    scanning: bool,
}

fn run_command<T: HciTransport>(transport: &T, command: HciCommand) -> Result<(), HciError> {
    let opcode = command.opcode();
    let status = transport.send_command(&command, COMMAND_TIMEOUT)?;
    if status != 0 {
        return Err(HciError::CommandFailed { opcode, status });
    }
    Ok(())
}

impl<T: HciTransport> ScanSession<T> {
    pub fn new(transport: T, config: ScanConfig) -> Self {
        ScanSession {
            transport: Some(transport),
            config,
            started_at: Instant::now(),
            events_seen: 0,
            scanning: false,
        }
    }

    /// Number of report-bearing meta-events observed so far.
    pub fn events_seen(&self) -> u32 {
        self.events_seen
    }

    /// Bring the radio from an unknown state into scanning.
    ///
    /// Runs reset, scan parameters, LE event mask, and scan enable in order,
    /// then narrows the transport's event filter to LE meta-events. Any
    /// command failure aborts the whole sequence; a partially configured
    /// radio is never scanned with.
    pub fn start(&mut self) -> Result<(), HciError> {
        let transport = self.transport.as_ref().ok_or(HciError::SessionClosed)?;

        run_command(transport, HciCommand::Reset)?;
        run_command(
            transport,
            HciCommand::LeSetScanParameters {
                scan_type: self.config.scan_type,
                interval: self.config.interval,
                window: self.config.window,
            },
        )?;
        run_command(transport, HciCommand::LeSetEventMask)?;
        run_command(transport, HciCommand::LeSetScanEnable { enable: true })?;
        self.scanning = true;
        self.started_at = Instant::now();

        transport.set_event_filter()?;

        info!(
            "scanning ({:?}, interval {} window {} units)",
            self.config.scan_type, self.config.interval, self.config.window
        );
        Ok(())
    }

    /// Drive the session until a terminating condition.
    ///
    /// `on_report` is invoked for every decoded report when no target is
    /// configured. With a target, reports are only compared against it and
    /// the session ends at the first match. Short and malformed reads are
    /// skipped; a hard transport error ends the session after shutdown runs.
    pub fn run<F>(&mut self, token: &CancelToken, mut on_report: F) -> Result<ScanOutcome, HciError>
    where
        F: FnMut(&AdvertisingReport),
    {
        if let Some(timeout) = self.config.timeout {
            token.arm(timeout);
        }

        let mut buffer = [0u8; HCI_MAX_EVENT_SIZE];

        loop {
            if let Some(cause) = token.status() {
                self.shutdown();
                return Ok(cause.into());
            }

            let slice = match token.time_remaining() {
                Some(remaining) => remaining.min(READ_SLICE),
                None => READ_SLICE,
            };

            let transport = self.transport.as_ref().ok_or(HciError::SessionClosed)?;
            let len = match transport.read_event(&mut buffer, slice) {
                Ok(len) => len,
                Err(e) => {
                    self.shutdown();
                    return Err(e);
                }
            };

            // Spurious or partial read: skip, keep scanning
            if len < 1 + HCI_EVENT_HDR_SIZE {
                continue;
            }
            if buffer[0] != HCI_EVENT_PKT || buffer[1] != EVT_LE_META_EVENT {
                continue;
            }

            let param_len = buffer[2] as usize;
            let end = (3 + param_len).min(len);
            let Some(reports) = AdvReports::parse(&buffer[3..end]) else {
                continue;
            };

            let mut saw_report = false;
            let mut matched = None;
            for report in reports {
                saw_report = true;
                match self.config.target {
                    Some(target) => {
                        if report.address == target {
                            matched = Some(self.started_at.elapsed());
                            break;
                        }
                    }
                    None => on_report(&report),
                }
            }

            if let Some(elapsed) = matched {
                self.shutdown();
                return Ok(ScanOutcome::TargetFound { elapsed });
            }

            if saw_report {
                self.events_seen += 1;
                if self.config.rearm_on_report {
                    if let Some(timeout) = self.config.timeout {
                        token.rearm(timeout);
                    }
                }
                if let Some(max) = self.config.max_events {
                    if self.events_seen >= max {
                        self.shutdown();
                        return Ok(ScanOutcome::EventLimitReached);
                    }
                }
            }
        }
    }

    /// The single exit path: disable scanning (best effort) and close the
    /// device. Idempotent; later calls return immediately.
    pub fn shutdown(&mut self) {
        let Some(transport) = self.transport.take() else {
            return;
        };

        if self.scanning {
            match transport.send_command(
                &HciCommand::LeSetScanEnable { enable: false },
                COMMAND_TIMEOUT,
            ) {
                Ok(0) => {}
                Ok(status) => warn!("scan disable returned status {:#04x}", status),
                Err(e) => warn!("failed to disable scanning: {}", e),
            }
            self.scanning = false;
        }

        info!("scan session closed");
        // transport dropped here, closing the device handle
    }
}

impl<T: HciTransport> Drop for ScanSession<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
