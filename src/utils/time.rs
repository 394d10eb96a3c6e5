use chrono::{Local, SecondsFormat};

/// Current local time as an RFC 3339 / ISO-8601 timestamp with microseconds.
pub fn iso_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
