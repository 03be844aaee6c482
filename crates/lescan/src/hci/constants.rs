//! HCI protocol constants
//!
//! This module contains constants used in the Bluetooth HCI protocol.

// HCI packet types
pub const HCI_COMMAND_PKT: u8 = 0x01;
pub const HCI_EVENT_PKT: u8 = 0x04;

// Packet sizes
pub const HCI_MAX_EVENT_SIZE: usize = 260;
pub const HCI_EVENT_HDR_SIZE: usize = 2;

// Common OGF (Opcode Group Field) values
pub const OGF_HOST_CTL: u8 = 0x03;
pub const OGF_LE: u8 = 0x08;

// Host Controller Commands (OGF: 0x03)
pub const OCF_RESET: u16 = 0x0003;

// LE Command OCF values (OGF: 0x08)
pub const OCF_LE_SET_EVENT_MASK: u16 = 0x0001;
pub const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
pub const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;

// HCI Events
pub const EVT_CMD_COMPLETE: u8 = 0x0E;
pub const EVT_CMD_STATUS: u8 = 0x0F;
pub const EVT_LE_META_EVENT: u8 = 0x3E;

// LE Meta Events
pub const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;

// Fixed fields of the LE scan commands
pub const OWN_ADDRESS_TYPE_PUBLIC: u8 = 0x00;
pub const SCAN_FILTER_POLICY_ACCEPT_ALL: u8 = 0x00;

// Advertising report record layout: event_type(1) address_type(1)
// address(6) data_length(1), followed by data and a trailing RSSI byte
pub const ADV_REPORT_HDR_SIZE: usize = 9;

// Kernel HCI socket filter (struct hci_filter)
pub const SOL_HCI: libc::c_int = 0;
pub const HCI_FILTER: libc::c_int = 2;
