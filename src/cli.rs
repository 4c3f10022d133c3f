//! Command-line parsing.
//!
//! Flags follow the single-dash style the tool has always used (`-pr 1000`,
//! `-pr=1000`); the double-dash spelling is accepted too. Parsing stops at the
//! first argument that is not a flag, or after `--`.

use crate::error::DongleError;
use crate::protocol::DEFAULT_PRODUCT_ID;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `-h` / `-help`: print usage and exit.
    Help,
    /// Open the dongle and apply the requested settings.
    Apply(Options),
}

/// Parsed flag values.
///
/// Settings keep their raw command-line form so that out-of-range values can
/// be reported and skipped by the dispatcher instead of failing the parse.
/// Zero (or the empty string for motion sync) means "not requested".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub product_id: String,
    pub polling_rate: i64,
    pub debounce: i64,
    pub motion_sync: String,
    supplied: Vec<&'static str>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            polling_rate: 0,
            debounce: 0,
            motion_sync: String::new(),
            supplied: Vec::new(),
        }
    }
}

impl Options {
    /// Number of distinct flags given on the command line.
    pub fn flags_supplied(&self) -> usize {
        self.supplied.len()
    }

    /// More than one flag was given while still targeting the default dongle.
    ///
    /// Overriding the product ID lifts the one-setting limit entirely.
    pub fn too_many_settings(&self) -> bool {
        self.flags_supplied() > 1 && self.product_id == DEFAULT_PRODUCT_ID
    }

    fn mark_supplied(&mut self, flag: &'static str) {
        if !self.supplied.contains(&flag) {
            self.supplied.push(flag);
        }
    }
}

/// Parse the arguments that follow the program name.
pub fn parse_args<I, S>(args: I) -> Result<Command, DongleError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        if arg == "--" || arg.len() < 2 || !arg.starts_with('-') {
            break;
        }

        let stripped = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .unwrap_or(arg.as_str());
        if stripped.is_empty() || stripped.starts_with('-') || stripped.starts_with('=') {
            return Err(DongleError::UnknownFlag(stripped.to_string()));
        }

        let (name, inline_value) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (stripped, None),
        };

        let flag: &'static str = match name {
            "h" | "help" => return Ok(Command::Help),
            "pr" => "pr",
            "db" => "db",
            "ms" => "ms",
            "pid" => "pid",
            other => return Err(DongleError::UnknownFlag(other.to_string())),
        };

        // Like Go's flag package, a value-taking flag swallows the next
        // argument even if it starts with a dash.
        let value = match inline_value.or_else(|| args.next()) {
            Some(value) => value,
            None => return Err(DongleError::MissingArgumentValue(flag.to_string())),
        };

        match flag {
            "pr" => options.polling_rate = parse_int(flag, &value)?,
            "db" => options.debounce = parse_int(flag, &value)?,
            "ms" => options.motion_sync = value,
            _ => options.product_id = value,
        }
        options.mark_supplied(flag);
    }

    if options.product_id.is_empty() {
        options.product_id = DEFAULT_PRODUCT_ID.to_string();
    }

    Ok(Command::Apply(options))
}

fn parse_int(flag: &'static str, value: &str) -> Result<i64, DongleError> {
    parse_go_int(value).ok_or_else(|| DongleError::InvalidArgument {
        flag,
        value: value.to_string(),
        reason: "not an integer",
    })
}

/// Integer syntax of Go's `strconv.ParseInt(s, 0, 64)`: optional sign, then
/// a `0x`, `0o`, `0b` or bare `0` (octal) prefix, with `_` allowed between
/// digits.
fn parse_go_int(value: &str) -> Option<i64> {
    let (negative, body) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let (radix, digits) = if let Some(d) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, d)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    // An underscore must sit between two digits, or between the prefix and
    // a digit.
    let mut groups = digits.split('_');
    if groups.next().is_some_and(|first| first.is_empty() && radix == 10) {
        return None;
    }
    if groups.any(str::is_empty) {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = u64::from_str_radix(&cleaned, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(args: &[&str]) -> Options {
        match parse_args(args.iter().copied()).unwrap() {
            Command::Apply(options) => options,
            Command::Help => panic!("expected options, got help"),
        }
    }

    #[test]
    fn no_args_is_default_startup() {
        let options = apply(&[]);
        assert_eq!(options, Options::default());
        assert_eq!(options.product_id, "f505");
        assert_eq!(options.flags_supplied(), 0);
        assert!(!options.too_many_settings());
    }

    #[test]
    fn accepts_separate_and_inline_values() {
        assert_eq!(apply(&["-pr", "1000"]).polling_rate, 1000);
        assert_eq!(apply(&["-pr=1000"]).polling_rate, 1000);
        assert_eq!(apply(&["--db", "4"]).debounce, 4);
        assert_eq!(apply(&["--ms=on"]).motion_sync, "on");
        assert_eq!(apply(&["-pid", "f5a1"]).product_id, "f5a1");
    }

    #[test]
    fn out_of_table_values_still_parse() {
        let options = apply(&["-db=3"]);
        assert_eq!(options.debounce, 3);
        assert_eq!(apply(&["-ms", "sideways"]).motion_sync, "sideways");
    }

    #[test]
    fn empty_product_id_falls_back_to_default() {
        let options = apply(&["-pid="]);
        assert_eq!(options.product_id, DEFAULT_PRODUCT_ID);
        assert_eq!(options.flags_supplied(), 1);
    }

    #[test]
    fn two_settings_on_default_dongle_are_rejected() {
        assert!(apply(&["-pr", "1000", "-db", "4"]).too_many_settings());
        // Zero still counts as a supplied flag.
        assert!(apply(&["-pr=1000", "-db=0"]).too_many_settings());
        // Naming the default product ID explicitly does not lift the limit.
        assert!(apply(&["-pid", "f505", "-ms", "on"]).too_many_settings());
    }

    #[test]
    fn product_id_override_lifts_the_limit() {
        assert!(!apply(&["-pid", "f501", "-pr", "1000"]).too_many_settings());
        assert!(!apply(&["-pid", "f501", "-pr", "1000", "-db", "4"]).too_many_settings());
    }

    #[test]
    fn repeated_flag_counts_once_and_last_wins() {
        let options = apply(&["-pr", "500", "-pr", "2000"]);
        assert_eq!(options.polling_rate, 2000);
        assert_eq!(options.flags_supplied(), 1);
        assert!(!options.too_many_settings());
    }

    #[test]
    fn parsing_stops_at_first_positional() {
        let options = apply(&["-pr", "250", "extra", "-db", "4"]);
        assert_eq!(options.polling_rate, 250);
        assert_eq!(options.debounce, 0);

        let options = apply(&["--", "-pr", "250"]);
        assert_eq!(options.polling_rate, 0);
    }

    #[test]
    fn help_flags() {
        for flag in ["-h", "--h", "-help", "--help"] {
            assert_eq!(parse_args([flag]).unwrap(), Command::Help);
        }
    }

    #[test]
    fn usage_errors() {
        assert!(matches!(parse_args(["-bogus"]), Err(DongleError::UnknownFlag(ref f)) if f == "bogus"));
        assert!(matches!(parse_args(["-pr"]), Err(DongleError::MissingArgumentValue(ref f)) if f == "pr"));
        assert!(matches!(
            parse_args(["-pr", "fast"]),
            Err(DongleError::InvalidArgument { flag: "pr", .. })
        ));
        assert!(matches!(parse_args(["---pr"]), Err(DongleError::UnknownFlag(_))));
        assert!(parse_args(["-bogus"]).unwrap_err().is_usage());
    }

    #[test]
    fn value_flag_takes_next_argument_even_if_dashed() {
        let options = apply(&["-ms", "-pr"]);
        assert_eq!(options.motion_sync, "-pr");
        assert_eq!(options.polling_rate, 0);
    }

    #[test]
    fn integers_accept_go_prefixes_and_underscores() {
        assert_eq!(apply(&["-pr", "0x3e8"]).polling_rate, 1000);
        assert_eq!(apply(&["-pr=1_000"]).polling_rate, 1000);
        assert_eq!(apply(&["-db", "0o17"]).debounce, 15);
        assert_eq!(apply(&["-db", "024"]).debounce, 20);
        assert_eq!(apply(&["-db", "0b100"]).debounce, 4);
        assert_eq!(apply(&["-db", "0x_14"]).debounce, 20);
        assert_eq!(apply(&["-pr", "-250"]).polling_rate, -250);
        assert_eq!(apply(&["-pr", "+250"]).polling_rate, 250);
        assert_eq!(apply(&["-db", "0"]).debounce, 0);
    }

    #[test]
    fn malformed_integers_are_rejected() {
        for bad in ["", "_1000", "1000_", "1__000", "08", "0x", "0xg", "1e3", "- 1", "9223372036854775808"] {
            assert!(
                matches!(parse_args(["-pr", bad]), Err(DongleError::InvalidArgument { flag: "pr", .. })),
                "{:?} should be rejected",
                bad
            );
        }
        assert_eq!(apply(&["-pr", "-9223372036854775808"]).polling_rate, i64::MIN);
    }
}
