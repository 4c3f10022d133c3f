//! Protocol constants for the Dragonfly receiver dongle.
//!
//! All magic numbers live here so the rest of the codebase references named
//! constants instead of raw hex.

// ---------------------------------------------------------------------------
// USB device identifiers
// ---------------------------------------------------------------------------

/// Dongle vendor ID (Compx, sold under the VGN brand).
pub const VENDOR_ID: u16 = 0x3554;

/// Product ID of the 4K receiver dongle, as typed on the command line.
pub const DEFAULT_PRODUCT_ID: &str = "f505";

// ---------------------------------------------------------------------------
// HID SET_REPORT control transfer
// ---------------------------------------------------------------------------

/// bmRequestType for host-to-device class request to an interface.
pub const HID_REQUEST_TYPE_OUT: u8 = 0x21;
/// HID SET_REPORT bRequest.
pub const HID_SET_REPORT: u8 = 0x09;
/// wValue: Report Type=Output (0x02), Report ID=0x08.
pub const HID_REPORT_VALUE_OUTPUT: u16 = 0x0208;
/// Vendor configuration interface.
pub const HID_INTERFACE: u16 = 1;
/// Every vendor report is exactly this long, report ID included.
///
/// The device acknowledges a write by accepting all of it, so a transfer that
/// moved fewer bytes is treated as not applied.
pub const REPORT_LEN: usize = 17;

/// A complete vendor report, ready to send.
pub type Report = [u8; REPORT_LEN];

/// USB control transfer timeout.
pub const USB_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);
