//! Typed dongle settings and their vendor report payloads.
//!
//! The payloads are opaque vendor constants captured from the official
//! software. Bytes 6/7 and 8/9 are (value, checksum) pairs whose sum is `0x55`;
//! nothing else about them is derived, so the tables are kept literal.

use std::fmt;

use crate::error::DongleError;
use crate::protocol::Report;

/// The three kinds of setting the dongle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    PollingRate,
    Debounce,
    MotionSync,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PollingRate => write!(f, "polling rate"),
            Self::Debounce => write!(f, "debounce"),
            Self::MotionSync => write!(f, "motion sync"),
        }
    }
}

/// Sensor report rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingRate {
    Hz125,
    Hz250,
    Hz500,
    Hz1000,
    Hz2000,
    Hz4000,
}

/// Click debounce delay.
///
/// A debounce of 0 ms is not a setting the dongle accepts; on the command line
/// it means "leave debounce alone".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounce {
    Ms1,
    Ms2,
    Ms4,
    Ms8,
    Ms15,
    Ms20,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSync {
    On,
    Off,
}

/// One validated setting, ready to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    PollingRate(PollingRate),
    Debounce(Debounce),
    MotionSync(MotionSync),
}

// --- Polling rate payloads ---

impl PollingRate {
    pub const ALL: [Self; 6] = [
        Self::Hz125,
        Self::Hz250,
        Self::Hz500,
        Self::Hz1000,
        Self::Hz2000,
        Self::Hz4000,
    ];

    pub fn payload(&self) -> Report {
        let (code, checksum) = match self {
            Self::Hz125  => (0x08, 0x4d),
            Self::Hz250  => (0x04, 0x51),
            Self::Hz500  => (0x02, 0x53),
            Self::Hz1000 => (0x01, 0x54),
            Self::Hz2000 => (0x10, 0x45),
            Self::Hz4000 => (0x20, 0x35),
        };
        [0x08, 0x07, 0x00, 0x00, 0x00, 0x06, code, checksum, 0x01, 0x54, 0x00, 0x55, 0x00, 0x00, 0x00, 0x00, 0x41]
    }

    pub fn hz(&self) -> u32 {
        match self {
            Self::Hz125 => 125,
            Self::Hz250 => 250,
            Self::Hz500 => 500,
            Self::Hz1000 => 1000,
            Self::Hz2000 => 2000,
            Self::Hz4000 => 4000,
        }
    }

    pub fn from_hz(hz: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| i64::from(rate.hz()) == hz)
    }
}

impl fmt::Display for PollingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hz())
    }
}

// --- Debounce payloads ---

impl Debounce {
    pub const ALL: [Self; 6] = [Self::Ms1, Self::Ms2, Self::Ms4, Self::Ms8, Self::Ms15, Self::Ms20];

    pub fn payload(&self) -> Report {
        // 15 ms goes out as 0x15, not 0x0f. That is what the vendor software sends.
        let (code, checksum) = match self {
            Self::Ms1  => (0x01, 0x54),
            Self::Ms2  => (0x02, 0x53),
            Self::Ms4  => (0x04, 0x51),
            Self::Ms8  => (0x08, 0x4d),
            Self::Ms15 => (0x15, 0x40),
            Self::Ms20 => (0x14, 0x41),
        };
        [0x08, 0x07, 0x00, 0x00, 0xa9, 0x0a, code, checksum, 0x01, 0x54, 0x06, 0x4f, 0x00, 0x55, 0x00, 0x55, 0xea]
    }

    pub fn millis(&self) -> u32 {
        match self {
            Self::Ms1 => 1,
            Self::Ms2 => 2,
            Self::Ms4 => 4,
            Self::Ms8 => 8,
            Self::Ms15 => 15,
            Self::Ms20 => 20,
        }
    }

    pub fn from_millis(ms: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|db| i64::from(db.millis()) == ms)
    }
}

impl fmt::Display for Debounce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.millis())
    }
}

// --- Motion sync payloads ---

impl MotionSync {
    pub fn payload(&self) -> Report {
        let (flag, checksum) = match self {
            Self::On  => (0x01, 0x54),
            Self::Off => (0x00, 0x55),
        };
        [0x08, 0x07, 0x00, 0x00, 0xa9, 0x0a, 0x00, 0x55, flag, checksum, 0x06, 0x4f, 0x00, 0x55, 0x00, 0x55, 0xea]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

impl fmt::Display for MotionSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

impl Setting {
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::PollingRate(_) => SettingKind::PollingRate,
            Self::Debounce(_) => SettingKind::Debounce,
            Self::MotionSync(_) => SettingKind::MotionSync,
        }
    }

    /// Validate a raw command-line value against the table for `kind`.
    pub fn parse(kind: SettingKind, value: &str) -> Option<Self> {
        match kind {
            SettingKind::PollingRate => value.parse().ok().and_then(PollingRate::from_hz).map(Self::PollingRate),
            SettingKind::Debounce => value.parse().ok().and_then(Debounce::from_millis).map(Self::Debounce),
            SettingKind::MotionSync => MotionSync::from_str(value).map(Self::MotionSync),
        }
    }

    pub fn payload(&self) -> Report {
        match self {
            Self::PollingRate(rate) => rate.payload(),
            Self::Debounce(db) => db.payload(),
            Self::MotionSync(ms) => ms.payload(),
        }
    }

    /// Message printed once the dongle has accepted the report.
    pub fn applied_message(&self) -> String {
        match self {
            Self::PollingRate(rate) => format!("Polling rate set to {}", rate),
            Self::Debounce(db) => format!("Debounce set to {}", db),
            Self::MotionSync(ms) => format!("Motion sync has been turned {}", ms),
        }
    }
}

/// Encode a raw command-line value of the given kind into its vendor report.
///
/// Values are expected to have been validated already; anything outside the
/// table is reported as [`DongleError::UnexpectedValue`].
pub fn encode(kind: SettingKind, value: &str) -> Result<Report, DongleError> {
    Setting::parse(kind, value)
        .map(|setting| setting.payload())
        .ok_or_else(|| DongleError::UnexpectedValue {
            kind,
            value: value.to_string(),
        })
}
