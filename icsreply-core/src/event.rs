//! Invitation types.
//!
//! These mirror the parts of a VEVENT the reply workflow cares about. Every
//! field that may be missing from a real-world invitation is an `Option`.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ReplyResult;
use crate::ics::parse_invitation;
use crate::responder::extract_email;

/// A parsed invitation: one VEVENT plus calendar-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    /// Calendar-level METHOD (REQUEST, REPLY, ...)
    pub method: Option<String>,
    pub uid: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// DTSTAMP of the invitation, if present and readable
    pub stamp: Option<EventTime>,
    pub organizer: Option<Attendee>,
    /// Attendees in document order
    pub attendees: Vec<Attendee>,
    /// VTIMEZONE definitions shipped with the invitation
    pub timezones: Vec<TimezoneBlock>,
}

impl Invitation {
    /// Read and parse an invitation file. Invalid UTF-8 is replaced rather than rejected.
    pub fn from_file(path: &Path) -> ReplyResult<Self> {
        let bytes = std::fs::read(path)?;
        parse_invitation(&String::from_utf8_lossy(&bytes))
    }

    /// The organizer's email, if the invitation names one.
    pub fn organizer_email(&self) -> Option<&str> {
        self.organizer.as_ref().map(Attendee::email)
    }
}

/// An event attendee (also used for organizer)
#[derive(Debug, Clone, PartialEq)]
pub struct Attendee {
    /// Display name (CN)
    pub name: Option<String>,
    pub address: CalAddress,
    /// PARTSTAT, absent or unrecognised values are `None`
    pub status: Option<ParticipationStatus>,
    /// Remaining parameters in document order (RSVP, ROLE, ...)
    pub params: Vec<(String, String)>,
}

impl Attendee {
    pub fn email(&self) -> &str {
        extract_email(&self.address)
    }
}

/// The two ways calendar software stores a calendar user's email.
#[derive(Debug, Clone, PartialEq)]
pub enum CalAddress {
    /// An `EMAIL=` parameter next to the property value.
    Structured { email: String, uri: String },
    /// Only the property value, e.g. `mailto:alice@example.com`.
    Uri(String),
}

impl CalAddress {
    /// The raw property value.
    pub fn uri(&self) -> &str {
        match self {
            CalAddress::Structured { uri, .. } => uri,
            CalAddress::Uri(uri) => uri,
        }
    }
}

/// PARTSTAT values for a VEVENT attendee (RFC 5545 §3.2.12)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationStatus {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
    Delegated,
}

impl ParticipationStatus {
    pub fn from_ics_str(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" => Some(ParticipationStatus::NeedsAction),
            "ACCEPTED" => Some(ParticipationStatus::Accepted),
            "DECLINED" => Some(ParticipationStatus::Declined),
            "TENTATIVE" => Some(ParticipationStatus::Tentative),
            "DELEGATED" => Some(ParticipationStatus::Delegated),
            _ => None,
        }
    }

    pub fn as_ics_str(self) -> &'static str {
        match self {
            ParticipationStatus::NeedsAction => "NEEDS-ACTION",
            ParticipationStatus::Accepted => "ACCEPTED",
            ParticipationStatus::Declined => "DECLINED",
            ParticipationStatus::Tentative => "TENTATIVE",
            ParticipationStatus::Delegated => "DELEGATED",
        }
    }
}

/// The answers a user can send back to the organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Accepted,
    Declined,
    Tentative,
}

impl Response {
    /// Capitalized form used in mail subjects, e.g. "Accepted".
    pub fn label(self) -> &'static str {
        match self {
            Response::Accepted => "Accepted",
            Response::Declined => "Declined",
            Response::Tentative => "Tentative",
        }
    }
}

impl From<Response> for ParticipationStatus {
    fn from(response: Response) -> Self {
        match response {
            Response::Accepted => ParticipationStatus::Accepted,
            Response::Declined => ParticipationStatus::Declined,
            Response::Tentative => ParticipationStatus::Tentative,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ParticipationStatus::from(*self).as_ics_str())
    }
}

/// A raw VTIMEZONE component, kept line by line (unfolded).
#[derive(Debug, Clone, PartialEq)]
pub struct TimezoneBlock {
    pub tzid: String,
    pub lines: Vec<String>,
}

/// A point in time as written in the ics file.
///
/// Keeps the difference between UTC, floating and zoned times so a
/// re-serialized property matches the input.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// The TZID this time refers to, if any.
    pub fn tzid(&self) -> Option<&str> {
        match self {
            EventTime::DateTimeZoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    /// Express this time in `tz`.
    ///
    /// Floating times, all-day dates and zones chrono-tz doesn't know are
    /// read as wall clock time in `tz`.
    pub fn in_zone<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            EventTime::DateTimeUtc(dt) => Some(dt.with_timezone(tz)),
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<chrono_tz::Tz>() {
                Ok(zone) => zone
                    .from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(tz)),
                Err(_) => {
                    tracing::warn!(%tzid, "unknown TZID, showing wall clock time");
                    tz.from_local_datetime(datetime).earliest()
                }
            },
            EventTime::DateTimeFloating(datetime) => tz.from_local_datetime(datetime).earliest(),
            EventTime::Date(date) => tz
                .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
                .earliest(),
        }
    }
}
