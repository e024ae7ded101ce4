use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "flowzen-dev",
            Profile::Prod => "flowzen",
        }
    }
}

/// Get the configuration directory path for FlowZen
/// If profile is Dev, uses "flowzen-dev" instead of "flowzen"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "flowzen", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for FlowZen
/// If profile is Dev, uses "flowzen-dev" instead of "flowzen"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "flowzen", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Parse a time of day in 24h `HH:MM` format
pub fn parse_time(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(time_str.trim(), "%H:%M")
}

/// Whether `date` carries a time-of-day.
///
/// Midnight exactly (all of hours, minutes, seconds and sub-seconds zero) is the
/// date-only sentinel.
pub fn has_time(date: DateTime<Utc>) -> bool {
    date.hour() != 0 || date.minute() != 0 || date.second() != 0 || date.nanosecond() != 0
}

/// The date-only instant for `day`.
pub fn date_only(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Combines a calendar day with an optional `HH:MM` time, as the item form does.
pub fn due_at(day: NaiveDate, time: Option<NaiveTime>) -> DateTime<Utc> {
    match time {
        Some(time) => Utc.from_utc_datetime(&day.and_time(time)),
        None => date_only(day),
    }
}

/// Formats a due date for display, omitting the time for date-only values.
pub fn format_due(date: DateTime<Utc>) -> String {
    if has_time(date) {
        date.format("%Y-%m-%d %H:%M").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}
