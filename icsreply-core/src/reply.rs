//! Building a METHOD:REPLY answer to an invitation.

use chrono::{DateTime, Utc};

use crate::event::{Attendee, EventTime, Invitation, Response, TimezoneBlock};

/// Attendee parameters that only make sense in a request.
const ADVISORY_PARAMS: [&str; 4] = ["RSVP", "ROLE", "X-NUM-GUESTS", "CUTYPE"];

/// A reply to an invitation, carrying exactly one attendee: the responder.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub uid: Option<String>,
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub organizer: Option<Attendee>,
    /// DTSTAMP of the reply
    pub stamp: EventTime,
    pub attendee: Attendee,
    /// VTIMEZONE definitions referenced by the times above
    pub timezones: Vec<TimezoneBlock>,
}

impl Reply {
    pub fn build(invitation: &Invitation, responder: &Attendee, response: Response) -> Self {
        Self::build_at(invitation, responder, response, Utc::now())
    }

    pub fn build_at(
        invitation: &Invitation,
        responder: &Attendee,
        response: Response,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = stamp_like(&invitation.start, now);

        let used_tzids: Vec<&str> = [&invitation.start, &invitation.end, &stamp]
            .into_iter()
            .filter_map(EventTime::tzid)
            .collect();
        let timezones = invitation
            .timezones
            .iter()
            .filter(|tz| used_tzids.contains(&tz.tzid.as_str()))
            .cloned()
            .collect();

        Reply {
            uid: invitation.uid.clone(),
            summary: invitation.summary.clone(),
            start: invitation.start.clone(),
            end: invitation.end.clone(),
            organizer: invitation.organizer.clone(),
            stamp,
            attendee: answering_attendee(responder, response),
            timezones,
        }
    }
}

/// Copy of `responder` with the new PARTSTAT and no request-only parameters.
fn answering_attendee(responder: &Attendee, response: Response) -> Attendee {
    let params = responder
        .params
        .iter()
        .filter(|(key, _)| !ADVISORY_PARAMS.iter().any(|p| p.eq_ignore_ascii_case(key)))
        .cloned()
        .collect();

    Attendee {
        name: responder.name.clone(),
        address: responder.address.clone(),
        status: Some(response.into()),
        params,
    }
}

/// `now`, written the same way as `template` (UTC, floating or in its TZID).
fn stamp_like(template: &EventTime, now: DateTime<Utc>) -> EventTime {
    match template {
        EventTime::DateTimeZoned { tzid, .. } => match tzid.parse::<chrono_tz::Tz>() {
            Ok(tz) => EventTime::DateTimeZoned {
                datetime: now.with_timezone(&tz).naive_local(),
                tzid: tzid.clone(),
            },
            Err(_) => {
                tracing::warn!(%tzid, "unknown TZID, stamping reply in UTC");
                EventTime::DateTimeUtc(now)
            }
        },
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(now.naive_utc()),
        EventTime::DateTimeUtc(_) | EventTime::Date(_) => EventTime::DateTimeUtc(now),
    }
}
