//! Plain text rendering of invitations for the terminal.

use chrono_tz::Tz;
use icsreply_core::{Attendee, EventTime, Invitation};

const TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p %Z";
const NAIVE_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Extension trait for terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Invitation {
    fn render(&self) -> String {
        render_invitation(self, &local_timezone())
    }
}

/// The machine's IANA zone, UTC if it can't be determined.
pub fn local_timezone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse().ok())
        .unwrap_or_else(|| {
            tracing::warn!("could not determine local timezone, using UTC");
            Tz::UTC
        })
}

/// Render the invitation summary with times shown in `tz`.
pub fn render_invitation(invitation: &Invitation, tz: &Tz) -> String {
    let sender = invitation.organizer_email().unwrap_or("NO SENDER");
    let description = invitation
        .description
        .as_deref()
        .unwrap_or("NO DESCRIPTION");
    let attendees: Vec<String> = invitation.attendees.iter().map(render_attendee).collect();

    let lines = [
        format!("Start:\t{}", render_time(&invitation.start, tz)),
        format!("End:\t{}", render_time(&invitation.end, tz)),
        format!("From:\t{sender}"),
        format!("Title:\t{}", invitation.summary),
        format!("To:\t{}", attendees.join(", ")),
        String::new(),
        description.to_string(),
    ];

    lines.join("\n")
}

fn render_time(time: &EventTime, tz: &Tz) -> String {
    match time.in_zone(tz) {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        // Wall clock time skipped by a DST change, show it as written
        None => match time {
            EventTime::DateTimeZoned { datetime, tzid } => {
                format!("{} {tzid}", datetime.format(NAIVE_FORMAT))
            }
            EventTime::DateTimeFloating(datetime) => datetime.format(NAIVE_FORMAT).to_string(),
            EventTime::Date(date) => date.format("%Y-%m-%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format(TIME_FORMAT).to_string(),
        },
    }
}

fn render_attendee(attendee: &Attendee) -> String {
    match attendee.name {
        Some(ref name) => format!("{} <{}>", name, attendee.email()),
        None => format!("<{}>", attendee.email()),
    }
}
