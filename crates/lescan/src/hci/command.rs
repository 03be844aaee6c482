//! HCI command construction and serialization
//!
//! The scan session needs exactly four control commands: a reset to force a
//! known radio state, scan parameters, the LE event mask, and the scan
//! enable/disable toggle. Each is built fresh per send and serialized to a
//! raw command packet.

use crate::hci::constants::*;
use crate::types::ScanType;

/// HCI commands used by the scan session
#[derive(Debug, Clone)]
pub enum HciCommand {
    /// Host Controller Reset (OGF: 0x03)
    Reset,

    /// LE Set Scan Parameters (OGF: 0x08)
    ///
    /// Interval and window are in 0.625 ms units. Own address type is fixed
    /// to public and the filter policy to accept-all; values outside the
    /// controller's accepted range are rejected by the controller, not here.
    LeSetScanParameters {
        scan_type: ScanType,
        interval: u16,
        window: u16,
    },

    /// LE Set Event Mask (OGF: 0x08), all LE meta-events enabled
    LeSetEventMask,

    /// LE Set Scan Enable (OGF: 0x08)
    ///
    /// Duplicate filtering is always off so every advertisement is
    /// delivered, repeats included.
    LeSetScanEnable { enable: bool },
}

impl HciCommand {
    /// Get the OGF and OCF for this command
    pub fn opcode_parts(&self) -> (u8, u16) {
        match self {
            Self::Reset => (OGF_HOST_CTL, OCF_RESET),
            Self::LeSetScanParameters { .. } => (OGF_LE, OCF_LE_SET_SCAN_PARAMETERS),
            Self::LeSetEventMask => (OGF_LE, OCF_LE_SET_EVENT_MASK),
            Self::LeSetScanEnable { .. } => (OGF_LE, OCF_LE_SET_SCAN_ENABLE),
        }
    }

    /// The combined 16-bit opcode as it appears on the wire
    pub fn opcode(&self) -> u16 {
        let (ogf, ocf) = self.opcode_parts();
        ((ogf as u16) << 10) | (ocf & 0x3ff)
    }

    /// Convert the command to its raw parameter bytes
    fn parameters(&self) -> Vec<u8> {
        match *self {
            Self::Reset => vec![],

            Self::LeSetScanParameters {
                scan_type,
                interval,
                window,
            } => {
                let mut params = Vec::with_capacity(7);
                params.push(scan_type.into());
                params.extend_from_slice(&interval.to_le_bytes());
                params.extend_from_slice(&window.to_le_bytes());
                params.push(OWN_ADDRESS_TYPE_PUBLIC);
                params.push(SCAN_FILTER_POLICY_ACCEPT_ALL);
                params
            }

            Self::LeSetEventMask => vec![0xFF; 8],

            Self::LeSetScanEnable { enable } => {
                // second byte: duplicate filtering disabled
                vec![enable as u8, 0x00]
            }
        }
    }

    /// Convert the command to a raw HCI packet
    pub fn to_packet(&self) -> Vec<u8> {
        let params = self.parameters();

        let mut packet = vec![HCI_COMMAND_PKT];
        packet.extend_from_slice(&self.opcode().to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(&params);
        packet
    }
}
