//! VGN Dragonfly receiver dongle controller library.
//!
//! Sets polling rate, click debounce and motion sync on the 4K receiver
//! dongle (`3554:f505`) by sending 17-byte vendor HID reports over USB
//! control transfers.
//!
//! # Quick Start
//!
//! ```no_run
//! use dragonfly_linux::{DongleSession, PollingRate, ReportTransport, VENDOR_ID};
//!
//! let session = DongleSession::open(VENDOR_ID, "f505")?;
//! let sent = session.set_report(&PollingRate::Hz1000.payload())?;
//! assert_eq!(sent, 17);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
mod device;
pub mod dispatch;
mod error;
mod hid;
mod protocol;
mod settings;

pub use device::{parse_product_id, DongleSession};
pub use error::DongleError;
pub use hid::ReportTransport;
pub use protocol::{Report, DEFAULT_PRODUCT_ID, REPORT_LEN, VENDOR_ID};
pub use settings::{encode, Debounce, MotionSync, PollingRate, Setting, SettingKind};
