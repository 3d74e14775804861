//! ICS file parsing using the icalendar crate's parser.

use crate::error::{ReplyError, ReplyResult};
use crate::event::{Attendee, CalAddress, EventTime, Invitation, ParticipationStatus, TimezoneBlock};
use icalendar::{
    DatePerhapsTime,
    parser::{Property, read_calendar, unfold},
};

/// Parse ICS content into an Invitation.
///
/// Only the first VEVENT is read. Properties the reply doesn't need are
/// ignored, and broken optional ones are dropped instead of failing the parse.
pub fn parse_invitation(content: &str) -> ReplyResult<Invitation> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| ReplyError::IcsParse(e.to_string()))?;

    let method = calendar
        .properties
        .iter()
        .find(|p| p.name.as_ref().eq_ignore_ascii_case("METHOD"))
        .map(|p| p.val.to_string());

    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT")
        .ok_or_else(|| ReplyError::IcsParse("no VEVENT found".into()))?;

    // Required fields
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .ok_or_else(|| ReplyError::IcsParse("event has no SUMMARY".into()))?;
    let start = required_time(vevent.find_prop("DTSTART"), "DTSTART")?;
    let end = required_time(vevent.find_prop("DTEND"), "DTEND")?;

    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let stamp = vevent.find_prop("DTSTAMP").and_then(|p| {
        let parsed = DatePerhapsTime::try_from(p).ok().map(to_event_time);
        if parsed.is_none() {
            tracing::debug!(value = %p.val, "ignoring malformed DTSTAMP");
        }
        parsed
    });

    let organizer = vevent.find_prop("ORGANIZER").and_then(parse_attendee);
    let attendees: Vec<Attendee> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .filter_map(parse_attendee)
        .collect();

    Ok(Invitation {
        method,
        uid,
        summary,
        description,
        start,
        end,
        stamp,
        organizer,
        attendees,
        timezones: collect_timezones(&unfolded),
    })
}

fn required_time(prop: Option<&Property>, name: &str) -> ReplyResult<EventTime> {
    let prop = prop.ok_or_else(|| ReplyError::IcsParse(format!("event has no {name}")))?;
    DatePerhapsTime::try_from(prop)
        .map(to_event_time)
        .map_err(|_| ReplyError::IcsParse(format!("malformed {name}: {}", prop.val)))
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}

/// Parse ATTENDEE/ORGANIZER property
///
/// Returns `None` when there is no usable address at all.
fn parse_attendee(prop: &Property) -> Option<Attendee> {
    let value = prop.val.as_ref().trim().to_string();

    let mut name = None;
    let mut email = None;
    let mut status = None;
    let mut params = Vec::new();

    for param in &prop.params {
        let key = param.key.as_ref();
        let val = param
            .val
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();

        match key.to_ascii_uppercase().as_str() {
            "CN" => name = Some(val),
            "EMAIL" => email = Some(val),
            "PARTSTAT" => status = ParticipationStatus::from_ics_str(&val),
            _ => params.push((key.to_string(), val)),
        }
    }

    let address = match email {
        Some(email) if !email.is_empty() => CalAddress::Structured { email, uri: value },
        _ if value.is_empty() => {
            tracing::debug!(property = %prop.name, "skipping property without address");
            return None;
        }
        _ => CalAddress::Uri(value),
    };

    Some(Attendee {
        name,
        address,
        status,
        params,
    })
}

/// Pull the raw VTIMEZONE components out of unfolded ICS text.
fn collect_timezones(unfolded: &str) -> Vec<TimezoneBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for line in unfolded.lines() {
        let line = line.trim_end_matches('\r');

        if line.eq_ignore_ascii_case("BEGIN:VTIMEZONE") {
            current = Some(Vec::new());
        }

        let Some(lines) = current.as_mut() else {
            continue;
        };
        lines.push(line.to_string());

        if line.eq_ignore_ascii_case("END:VTIMEZONE") {
            let lines = current.take().unwrap_or_default();
            match lines.iter().find_map(|l| l.strip_prefix("TZID:")) {
                Some(tzid) => blocks.push(TimezoneBlock {
                    tzid: tzid.to_string(),
                    lines,
                }),
                None => tracing::debug!("skipping VTIMEZONE without TZID"),
            }
        }
    }

    blocks
}
