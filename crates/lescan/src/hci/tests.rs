//! Unit tests for HCI packet parsing and serialization

use super::command::HciCommand;
use super::constants::*;
use super::event::{AdvReports, HciEvent};
use crate::types::{AddressType, BdAddr, ScanType};

#[test]
fn test_hci_command_serialization() {
    // Test Reset command
    let command = HciCommand::Reset;
    let packet = command.to_packet();

    assert_eq!(packet[0], HCI_COMMAND_PKT);

    // Opcode: Reset (0x0003)
    let opcode = u16::from_le_bytes([packet[1], packet[2]]);
    assert_eq!(opcode, 0x0C03); // OGF_HOST_CTL << 10 | OCF_RESET

    // Param length: 0
    assert_eq!(packet[3], 0);

    // Test LE Set Scan Parameters command
    let command = HciCommand::LeSetScanParameters {
        scan_type: ScanType::Active,
        interval: 0x00B2,
        window: 0x0008,
    };

    let packet = command.to_packet();

    assert_eq!(packet[0], HCI_COMMAND_PKT);

    // Opcode: LE Set Scan Parameters (0x000B)
    let opcode = u16::from_le_bytes([packet[1], packet[2]]);
    assert_eq!(opcode, 0x200B); // OGF_LE << 10 | OCF_LE_SET_SCAN_PARAMETERS

    // Param length: 7
    assert_eq!(packet[3], 7);

    // Parameters: interval and window little-endian in 0.625 ms units
    assert_eq!(packet[4], 0x01); // active scan
    assert_eq!(u16::from_le_bytes([packet[5], packet[6]]), 0x00B2);
    assert_eq!(u16::from_le_bytes([packet[7], packet[8]]), 0x0008);
    assert_eq!(packet[9], 0x00); // own_address_type public
    assert_eq!(packet[10], 0x00); // filter_policy accept all

    // Test LE Set Event Mask command: fixed all-ones mask
    let packet = HciCommand::LeSetEventMask.to_packet();
    let opcode = u16::from_le_bytes([packet[1], packet[2]]);
    assert_eq!(opcode, 0x2001);
    assert_eq!(packet[3], 8);
    assert_eq!(&packet[4..12], &[0xFF; 8]);

    // Test LE Set Scan Enable command: duplicate filtering always off
    let packet = HciCommand::LeSetScanEnable { enable: true }.to_packet();
    let opcode = u16::from_le_bytes([packet[1], packet[2]]);
    assert_eq!(opcode, 0x200C);
    assert_eq!(packet[3], 2);
    assert_eq!(packet[4], 0x01);
    assert_eq!(packet[5], 0x00);

    let packet = HciCommand::LeSetScanEnable { enable: false }.to_packet();
    assert_eq!(packet[4], 0x00);
    assert_eq!(packet[5], 0x00);
}

#[test]
fn test_hci_event_parsing() {
    // Create a simple Command Complete event
    let data = [
        EVT_CMD_COMPLETE, // Event code
        4,                // Parameter length
        1,                // Num_HCI_Command_Packets
        0x03,             // Command_Opcode (low byte)
        0x0C,             // Command_Opcode (high byte)
        0x00,             // Status
    ];

    let event = HciEvent::parse(&data).unwrap();

    assert_eq!(event.event_code, EVT_CMD_COMPLETE);
    assert_eq!(event.parameters, vec![1, 0x03, 0x0C, 0x00]);

    // Status lookup by opcode
    assert_eq!(event.command_status(0x0C03), Some(0x00));
    assert_eq!(event.command_status(0x200B), None);

    // Command Status event carries the status first
    let data = [
        EVT_CMD_STATUS,
        4,    // Parameter length
        0x0C, // Status
        1,    // Num_HCI_Command_Packets
        0x0B, // Command_Opcode (low byte)
        0x20, // Command_Opcode (high byte)
    ];

    let event = HciEvent::parse(&data).unwrap();
    assert_eq!(event.command_status(0x200B), Some(0x0C));

    // Invalid data tests
    assert!(HciEvent::parse(&[]).is_none()); // Empty data
    assert!(HciEvent::parse(&[EVT_CMD_COMPLETE, 10, 1, 2]).is_none()); // Too short for parameter length
}

/// Build meta-event parameter bytes carrying the given report records.
fn adv_params(num_reports: u8, records: &[&[u8]]) -> Vec<u8> {
    let mut params = vec![EVT_LE_ADVERTISING_REPORT, num_reports];
    for record in records {
        params.extend_from_slice(record);
    }
    params
}

#[test]
fn test_advertising_report_decoding() {
    // One report: Complete Local Name "Te", RSSI -61 dBm
    let record = [
        0, // Event_Type
        0, // Address_Type
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, // Address
        3,    // Data_Length
        0x09, 0x54, 0x65, // Data
        0xC3, // RSSI
    ];
    let params = adv_params(1, &[&record]);

    let reports: Vec<_> = AdvReports::parse(&params).unwrap().collect();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.event_type, 0);
    assert_eq!(report.address_type, AddressType::Public);
    assert_eq!(
        report.address,
        BdAddr::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06])
    );
    assert_eq!(report.data, vec![0x09, 0x54, 0x65]);
    assert_eq!(report.rssi, -61);
}

#[test]
fn test_advertising_report_multiple_in_order() {
    let first = [0, 0, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0, 0xB0];
    let second = [
        0x04, 0x01, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 2, 0xAA, 0xBB, 0xC8,
    ];
    let params = adv_params(2, &[&first, &second]);

    let reports: Vec<_> = AdvReports::parse(&params).unwrap().collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].address, BdAddr::new([0x11; 6]));
    assert_eq!(reports[0].rssi, -80);
    assert!(reports[0].data.is_empty());
    assert_eq!(reports[1].address, BdAddr::new([0x22; 6]));
    assert_eq!(reports[1].address_type, AddressType::Random);
    assert_eq!(reports[1].data, vec![0xAA, 0xBB]);
    assert_eq!(reports[1].rssi, -56);
}

#[test]
fn test_advertising_report_truncated_record_is_dropped() {
    let good = [0, 0, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 1, 0x2A, 0xB0];
    // Declares 10 data bytes but carries only 2
    let truncated = [0, 0, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 10, 0xAA, 0xBB];
    let params = adv_params(2, &[&good, &truncated]);

    let reports: Vec<_> = AdvReports::parse(&params).unwrap().collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].address, BdAddr::new([0x11; 6]));
}

#[test]
fn test_advertising_report_short_header_is_dropped() {
    // Second record cut off inside its fixed header
    let good = [0, 0, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0, 0xB0];
    let stub = [0, 0, 0x22];
    let params = adv_params(2, &[&good, &stub]);

    let reports: Vec<_> = AdvReports::parse(&params).unwrap().collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn test_advertising_report_invalid_buffers() {
    // Too short for subevent + count
    assert!(AdvReports::parse(&[EVT_LE_ADVERTISING_REPORT]).is_none());
    assert!(AdvReports::parse(&[]).is_none());

    // Wrong subevent
    assert!(AdvReports::parse(&[0x01, 1, 0, 0]).is_none());

    // Zero reports declared: empty sequence
    let reports: Vec<_> = AdvReports::parse(&[EVT_LE_ADVERTISING_REPORT, 0])
        .unwrap()
        .collect();
    assert!(reports.is_empty());

    // Declared count exceeds what the buffer holds
    let record = [0, 0, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0, 0xB0];
    let params = adv_params(5, &[&record]);
    let reports: Vec<_> = AdvReports::parse(&params).unwrap().collect();
    assert_eq!(reports.len(), 1);
}
