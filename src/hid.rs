//! HID SET_REPORT transport.
//!
//! Every setting is a single 17-byte Output report sent with SET_REPORT on
//! Interface 1. The dongle sends nothing back; the number of bytes the host
//! controller accepted is the only acknowledgement there is.

use tracing::debug;

use crate::device::{DongleSession, UsbHandle};
use crate::error::DongleError;
use crate::protocol::*;

/// Anything that can deliver a vendor report to the dongle.
///
/// [`DongleSession`] is the real implementation; the dispatcher only depends
/// on this trait so it can run against a recording transport in tests.
pub trait ReportTransport {
    /// Send one report and return how many bytes were transferred.
    fn set_report(&self, report: &Report) -> Result<usize, DongleError>;
}

impl<H: UsbHandle> ReportTransport for DongleSession<H> {
    fn set_report(&self, report: &Report) -> Result<usize, DongleError> {
        debug!(report = ?report, "SET_REPORT");

        let transferred = self.handle.write_control(
            HID_REQUEST_TYPE_OUT,
            HID_SET_REPORT,
            HID_REPORT_VALUE_OUTPUT,
            HID_INTERFACE,
            report,
            USB_TIMEOUT,
        ).map_err(|e| DongleError::HidTransfer(format!("SET_REPORT failed: {}", e)))?;

        debug!(transferred, "SET_REPORT complete");
        Ok(transferred)
    }
}
