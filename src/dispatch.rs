//! Applies parsed options to the dongle.
//!
//! Each setting kind runs independently: validate, encode, send, report.
//! A value outside its table is only a warning and that setting is skipped.
//! A transfer error aborts immediately; settings already sent stay applied.

use tracing::{info, warn};

use crate::cli::Options;
use crate::error::DongleError;
use crate::hid::ReportTransport;
use crate::protocol::REPORT_LEN;
use crate::settings::{Setting, SettingKind};

/// What happened to one requested setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The dongle accepted the whole report.
    Applied(Setting),
    /// The transfer went through but moved fewer bytes than a full report.
    Unacknowledged { setting: Setting, transferred: usize },
    /// The value was not in the table; nothing was sent.
    Skipped { kind: SettingKind, value: String },
}

/// The raw value of each requested setting, in the order they are applied.
fn requested(options: &Options) -> Vec<(SettingKind, String)> {
    let mut requested = Vec::new();
    if !options.motion_sync.is_empty() {
        requested.push((SettingKind::MotionSync, options.motion_sync.clone()));
    }
    if options.polling_rate != 0 {
        requested.push((SettingKind::PollingRate, options.polling_rate.to_string()));
    }
    if options.debounce != 0 {
        requested.push((SettingKind::Debounce, options.debounce.to_string()));
    }
    requested
}

/// Validate and send every requested setting.
pub fn dispatch(options: &Options, transport: &dyn ReportTransport) -> Result<Vec<Outcome>, DongleError> {
    let mut outcomes = Vec::new();

    for (kind, value) in requested(options) {
        let outcome = match Setting::parse(kind, &value) {
            Some(setting) => apply(setting, transport)?,
            None => {
                println!("Invalid {} setting received, ignoring...", kind);
                warn!(%kind, %value, "skipping setting outside the supported values");
                Outcome::Skipped { kind, value }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn apply(setting: Setting, transport: &dyn ReportTransport) -> Result<Outcome, DongleError> {
    let report = setting.payload();
    let transferred = transport.set_report(&report)?;

    if transferred == REPORT_LEN {
        println!("{}", setting.applied_message());
        info!(?setting, "setting applied");
        Ok(Outcome::Applied(setting))
    } else {
        warn!(
            ?setting,
            transferred,
            expected = REPORT_LEN,
            "dongle did not accept the full report"
        );
        Ok(Outcome::Unacknowledged { setting, transferred })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::cli::{parse_args, Command};
    use crate::protocol::Report;
    use crate::settings::{Debounce, MotionSync, PollingRate};

    /// Records every report and answers with a fixed transfer length.
    struct RecordingTransport {
        sent: RefCell<Vec<Report>>,
        answer: Result<usize, rusb::Error>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self::answering(Ok(REPORT_LEN))
        }

        fn answering(answer: Result<usize, rusb::Error>) -> Self {
            Self { sent: RefCell::new(Vec::new()), answer }
        }

        fn sent(&self) -> Vec<Report> {
            self.sent.borrow().clone()
        }
    }

    impl ReportTransport for RecordingTransport {
        fn set_report(&self, report: &Report) -> Result<usize, DongleError> {
            self.sent.borrow_mut().push(*report);
            self.answer.map_err(DongleError::Usb)
        }
    }

    fn options(args: &[&str]) -> Options {
        match parse_args(args.iter().copied()).unwrap() {
            Command::Apply(options) => options,
            Command::Help => panic!("expected options"),
        }
    }

    #[test]
    fn nothing_requested_sends_nothing() {
        let transport = RecordingTransport::new();
        let outcomes = dispatch(&options(&[]), &transport).unwrap();
        assert!(outcomes.is_empty());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn polling_rate_sends_exactly_one_report() {
        let transport = RecordingTransport::new();
        let outcomes = dispatch(&options(&["-pr=1000"]), &transport).unwrap();

        assert_eq!(transport.sent(), vec![PollingRate::Hz1000.payload()]);
        assert_eq!(outcomes, vec![Outcome::Applied(Setting::PollingRate(PollingRate::Hz1000))]);
    }

    #[test]
    fn debounce_and_motion_sync_send_their_payloads() {
        let transport = RecordingTransport::new();
        dispatch(&options(&["-db", "20"]), &transport).unwrap();
        dispatch(&options(&["-ms", "off"]), &transport).unwrap();

        assert_eq!(transport.sent(), vec![Debounce::Ms20.payload(), MotionSync::Off.payload()]);
    }

    #[test]
    fn invalid_value_is_skipped_without_transfer() {
        let transport = RecordingTransport::new();
        let outcomes = dispatch(&options(&["-db=3"]), &transport).unwrap();

        assert!(transport.sent().is_empty());
        assert_eq!(
            outcomes,
            vec![Outcome::Skipped { kind: SettingKind::Debounce, value: "3".to_string() }]
        );
    }

    #[test]
    fn debounce_zero_is_not_requested() {
        let transport = RecordingTransport::new();
        let outcomes = dispatch(&options(&["-db=0"]), &transport).unwrap();
        assert!(outcomes.is_empty());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn invalid_setting_does_not_stop_the_others() {
        let transport = RecordingTransport::new();
        let outcomes = dispatch(&options(&["-pid", "f501", "-ms", "maybe", "-pr", "4000"]), &transport).unwrap();

        assert_eq!(transport.sent(), vec![PollingRate::Hz4000.payload()]);
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], Outcome::Skipped { kind: SettingKind::MotionSync, .. }));
        assert_eq!(outcomes[1], Outcome::Applied(Setting::PollingRate(PollingRate::Hz4000)));
    }

    #[test]
    fn settings_go_out_in_fixed_order() {
        let transport = RecordingTransport::new();
        dispatch(&options(&["-pid", "f501", "-db", "8", "-pr", "125", "-ms", "on"]), &transport).unwrap();

        assert_eq!(
            transport.sent(),
            vec![MotionSync::On.payload(), PollingRate::Hz125.payload(), Debounce::Ms8.payload()]
        );
    }

    #[test]
    fn short_transfer_is_not_reported_as_applied() {
        let transport = RecordingTransport::answering(Ok(8));
        let outcomes = dispatch(&options(&["-pr", "500"]), &transport).unwrap();

        assert_eq!(
            outcomes,
            vec![Outcome::Unacknowledged { setting: Setting::PollingRate(PollingRate::Hz500), transferred: 8 }]
        );
    }

    #[test]
    fn transfer_error_aborts_remaining_settings() {
        let transport = RecordingTransport::answering(Err(rusb::Error::Pipe));
        let err = dispatch(&options(&["-pid", "f501", "-ms", "on", "-pr", "250"]), &transport).unwrap_err();

        assert!(matches!(err, DongleError::Usb(rusb::Error::Pipe)));
        // Only the first setting was attempted.
        assert_eq!(transport.sent(), vec![MotionSync::On.payload()]);
    }
}
