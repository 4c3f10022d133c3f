//! Custom error types for the dragonfly-linux tool.
//!
//! Library code returns [`DongleError`] instead of terminating the process, so
//! the binary decides in one place how each failure maps to an exit status.

use thiserror::Error;

use crate::settings::SettingKind;

/// Top-level error type for all dongle operations.
#[derive(Debug, Error)]
pub enum DongleError {
    /// The product ID given on the command line is not a 16-bit hex number.
    #[error("Couldn't convert product ID '{0}' to a 16-bit hex number")]
    InvalidProductId(String),

    /// No device with the requested vendor/product ID is connected.
    #[error("Couldn't open device with VID {vid:04x} and PID {pid:04x}. Make sure the dongle is connected.")]
    DeviceNotFound { vid: u16, pid: u16 },

    /// The platform refused automatic kernel driver detaching.
    #[error("Couldn't set auto detach on: {0}")]
    AutoDetach(#[source] rusb::Error),

    /// A USB/libusb transport error occurred.
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// Claiming an interface of the active configuration failed.
    #[error("Failed to claim interface {interface}: {source}")]
    ClaimInterface {
        interface: u8,
        #[source]
        source: rusb::Error,
    },

    /// A HID SET_REPORT transfer failed.
    #[error("HID transfer failed: {0}")]
    HidTransfer(String),

    /// A value reached the encoder without passing validation first.
    #[error("Unexpected {kind} value: {value}")]
    UnexpectedValue { kind: SettingKind, value: String },

    /// Invalid CLI argument value.
    #[error("Invalid value '{value}' for -{flag}: {reason}")]
    InvalidArgument {
        flag: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A flag that takes a value was given without one.
    #[error("flag needs an argument: -{0}")]
    MissingArgumentValue(String),

    /// A flag the tool does not know.
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),
}

impl DongleError {
    /// True for mistakes in the command line itself, as opposed to failures
    /// talking to the device.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::MissingArgumentValue(_) | Self::UnknownFlag(_)
        )
    }
}
