use super::*;
use crate::uri::Uri;
use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

const CSS_COLORS: [&str; 17] = [
    "aqua", "black", "blue", "fuchsia", "gray", "green", "lime", "maroon", "navy", "olive",
    "orange", "purple", "red", "silver", "teal", "white", "yellow",
];

macro_rules! static_regex {
    ($name:ident, $re:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($re).expect("static pattern is a valid regular expression"))
        }
    };
}

static_regex!(hex_color, r"^#(?:[0-9a-fA-F]{3}){1,2}$");
static_regex!(style_declaration, r"^\s*[a-zA-Z-]+\s*:\s*[^;:]+?\s*$");
static_regex!(phone_number, r"^\+(?:[0-9] ?){6,14}[0-9]$");
static_regex!(email_address, r"^[^@\s]+@[^@\s]+\.[^@\s.]+$");
static_regex!(host_label, r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$");

/// Check a value against its `format`. Unknown formats always pass, and only strings are checked
/// except for `utc-millisec`, which expects a number.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let format = match schema.format {
        Some(ref format) => format.as_str(),
        None => return Ok(()),
    };

    if format == "utc-millisec" {
        if !value.is_number() {
            checker.add_error(
                path,
                format!(
                    "{} value found, but utc-millisec requires a number of milliseconds",
                    value.type_name()
                ),
            );
        }
        return Ok(());
    }

    let text = match value.as_str() {
        Some(text) => text,
        None => return Ok(()),
    };
    let expected = match format {
        "date-time" if DateTime::parse_from_rfc3339(text).is_err() => {
            "an RFC 3339 date-time, like 2020-01-31T12:00:00Z"
        }
        "date" if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() => {
            "a date in the format YYYY-MM-DD"
        }
        "time" if NaiveTime::parse_from_str(text, "%H:%M:%S").is_err() => {
            "a time in the format hh:mm:ss"
        }
        "regex" if Regex::new(text).is_err() => "a valid regular expression",
        "color" if !is_color(text) => "a CSS color name or hex color",
        "style" if !is_style(text) => "a CSS style declaration",
        "phone" if !phone_number().is_match(text) => "an international phone number",
        "uri" if !Uri::is_valid(text) => "an absolute URI",
        "email" if !email_address().is_match(text) => "an email address",
        "ipv4" | "ip-address" if text.parse::<Ipv4Addr>().is_err() => "an IPv4 address",
        "ipv6" if text.parse::<Ipv6Addr>().is_err() => "an IPv6 address",
        "host-name" | "hostname" if !is_host_name(text) => "a host name",
        _ => return Ok(()),
    };
    checker.add_error(
        path,
        format!("\"{}\" is not a valid {}, expected {}", text, format, expected),
    );
    Ok(())
}

fn is_color(text: &str) -> bool {
    CSS_COLORS.iter().any(|name| name.eq_ignore_ascii_case(text)) || hex_color().is_match(text)
}

fn is_style(text: &str) -> bool {
    let mut declarations = text
        .split(';')
        .filter(|declaration| !declaration.trim().is_empty())
        .peekable();
    declarations.peek().is_some()
        && declarations.all(|declaration| style_declaration().is_match(declaration))
}

fn is_host_name(text: &str) -> bool {
    let text = text.strip_suffix('.').unwrap_or(text);
    !text.is_empty() && text.len() <= 253 && text.split('.').all(|label| host_label().is_match(label))
}
