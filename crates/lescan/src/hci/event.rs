//! HCI event parsing and the advertising-report decoder

use crate::hci::constants::*;
use crate::types::{AddressType, BdAddr};
use log::debug;

/// HCI Event packet
#[derive(Debug, Clone)]
pub struct HciEvent {
    pub event_code: u8,
    pub parameters: Vec<u8>,
}

impl HciEvent {
    /// Parse an HCI event from raw bytes (event code onward, no packet type)
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HCI_EVENT_HDR_SIZE {
            return None;
        }

        let event_code = data[0];
        let parameter_total_length = data[1] as usize;

        if data.len() < parameter_total_length + HCI_EVENT_HDR_SIZE {
            return None;
        }

        let parameters = data[2..parameter_total_length + 2].to_vec();

        Some(HciEvent {
            event_code,
            parameters,
        })
    }

    /// The status byte of a Command Complete or Command Status event for the
    /// given opcode, if this is one.
    pub fn command_status(&self, opcode: u16) -> Option<u8> {
        match self.event_code {
            // Command Complete: num_pkts(1) opcode(2) status(1)
            EVT_CMD_COMPLETE => {
                if self.parameters.len() >= 4
                    && u16::from_le_bytes([self.parameters[1], self.parameters[2]]) == opcode
                {
                    Some(self.parameters[3])
                } else {
                    None
                }
            }
            // Command Status: status(1) num_pkts(1) opcode(2)
            EVT_CMD_STATUS => {
                if self.parameters.len() >= 4
                    && u16::from_le_bytes([self.parameters[2], self.parameters[3]]) == opcode
                {
                    Some(self.parameters[0])
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// One advertising report decoded from an LE meta-event
#[derive(Debug, Clone)]
pub struct AdvertisingReport {
    pub event_type: u8,
    pub address_type: AddressType,
    pub address: BdAddr,
    pub data: Vec<u8>,
    pub rssi: i8,
}

/// Lazy decoder over the reports packed into one LE advertising-report
/// meta-event.
///
/// Single pass: each report is yielded at most once, in encounter order. A
/// record whose declared length would read past the received buffer
/// truncates the sequence; the remaining records are dropped, never read out
/// of bounds.
pub struct AdvReports<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: u8,
}

impl<'a> AdvReports<'a> {
    /// Begin decoding the parameter bytes of one LE meta-event.
    ///
    /// Returns `None` unless the payload carries the advertising-report
    /// subevent and at least the subevent and report-count bytes.
    pub fn parse(params: &'a [u8]) -> Option<AdvReports<'a>> {
        if params.len() < 2 || params[0] != EVT_LE_ADVERTISING_REPORT {
            return None;
        }

        Some(AdvReports {
            buf: params,
            pos: 2,
            remaining: params[1],
        })
    }
}

impl Iterator for AdvReports<'_> {
    type Item = AdvertisingReport;

    fn next(&mut self) -> Option<AdvertisingReport> {
        if self.remaining == 0 {
            return None;
        }

        // Fixed header: event_type(1) address_type(1) address(6) length(1)
        if self.pos + ADV_REPORT_HDR_SIZE > self.buf.len() {
            debug!(
                "truncated advertising report header at offset {}, dropping {} remaining",
                self.pos, self.remaining
            );
            self.remaining = 0;
            return None;
        }

        let data_length = self.buf[self.pos + 8] as usize;
        let end = self.pos + ADV_REPORT_HDR_SIZE + data_length + 1;
        if end > self.buf.len() {
            debug!(
                "advertising report data length {} overruns buffer, dropping {} remaining",
                data_length, self.remaining
            );
            self.remaining = 0;
            return None;
        }

        let record = &self.buf[self.pos..end];
        let report = AdvertisingReport {
            event_type: record[0],
            address_type: AddressType::from(record[1]),
            address: BdAddr::from_slice(&record[2..8])?,
            data: record[9..9 + data_length].to_vec(),
            rssi: record[9 + data_length] as i8,
        };

        self.pos = end;
        self.remaining -= 1;
        Some(report)
    }
}
