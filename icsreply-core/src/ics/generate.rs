//! ICS generation for replies.

use crate::error::ReplyResult;
use crate::event::{Attendee, CalAddress, EventTime};
use crate::reply::Reply;
use icalendar::{Calendar, Component, Property, ValueType};

/// Generate the .ics content of a METHOD:REPLY calendar
pub fn generate_reply(reply: &Reply) -> ReplyResult<String> {
    let mut cal = Calendar::new();
    cal.append_property(Property::new("METHOD", "REPLY"));

    let mut ics_event = icalendar::Event::new();

    if let Some(ref uid) = reply.uid {
        ics_event.add_property("UID", uid);
    }
    ics_event.add_property("SUMMARY", &reply.summary);

    add_datetime_property(&mut ics_event, "DTSTAMP", &reply.stamp);
    add_datetime_property(&mut ics_event, "DTSTART", &reply.start);
    add_datetime_property(&mut ics_event, "DTEND", &reply.end);

    if let Some(ref organizer) = reply.organizer {
        ics_event.append_property(address_property("ORGANIZER", organizer));
    }
    ics_event.append_multi_property(address_property("ATTENDEE", &reply.attendee));

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    Ok(tidy_reply(&cal.to_string(), reply))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Remove the UID the crate invents when the invitation had none
/// - Put the referenced VTIMEZONE definitions in front of the VEVENT
fn tidy_reply(ics: &str, reply: &Reply) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut skipping = false;

    for line in ics.lines() {
        // Folded continuation of a line we dropped
        if skipping && line.starts_with(' ') {
            continue;
        }
        skipping = false;

        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//icsreply//EN\r\n");
            skipping = true;
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if reply.uid.is_none() && line.starts_with("UID:") {
            skipping = true;
            continue;
        }

        if line == "BEGIN:VEVENT" {
            for block in &reply.timezones {
                for tz_line in &block.lines {
                    result.push_str(tz_line);
                    result.push_str("\r\n");
                }
            }
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a datetime property with proper formatting based on EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
        EventTime::DateTimeFloating(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
        EventTime::DateTimeZoned { datetime, tzid } => {
            let mut prop = Property::new(name, datetime.format("%Y%m%dT%H%M%S").to_string());
            prop.add_parameter("TZID", tzid);
            ics_event.append_property(prop);
        }
    }
}

/// Build an ORGANIZER/ATTENDEE property, keeping the address the way it was written
fn address_property(name: &str, attendee: &Attendee) -> Property {
    let mut prop = Property::new(name, attendee.address.uri());

    if let Some(ref cn) = attendee.name {
        prop.add_parameter("CN", cn);
    }
    if let CalAddress::Structured { email, .. } = &attendee.address {
        prop.add_parameter("EMAIL", email);
    }
    if let Some(status) = attendee.status {
        prop.add_parameter("PARTSTAT", status.as_ics_str());
    }
    for (key, value) in &attendee.params {
        prop.add_parameter(key, value);
    }

    prop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Invitation, ParticipationStatus, Response, TimezoneBlock};
    use crate::ics::parse_invitation;
    use crate::responder::find_responder;
    use chrono::{NaiveDate, TimeZone, Utc};
    use icalendar::parser::unfold;

    fn make_invitation() -> Invitation {
        Invitation {
            method: Some("REQUEST".to_string()),
            uid: Some("sprint-42@co.com".to_string()),
            summary: "Sprint Planning".to_string(),
            description: None,
            start: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()),
            end: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap()),
            stamp: None,
            organizer: Some(Attendee {
                name: Some("Boss".to_string()),
                address: CalAddress::Uri("mailto:boss@co.com".to_string()),
                status: None,
                params: vec![],
            }),
            attendees: vec![
                Attendee {
                    name: Some("Bob".to_string()),
                    address: CalAddress::Uri("mailto:bob@co.com".to_string()),
                    status: Some(ParticipationStatus::Accepted),
                    params: vec![],
                },
                Attendee {
                    name: Some("Alice".to_string()),
                    address: CalAddress::Structured {
                        email: "alice@co.com".to_string(),
                        uri: "mailto:alice@co.com".to_string(),
                    },
                    status: Some(ParticipationStatus::NeedsAction),
                    params: vec![
                        ("RSVP".to_string(), "TRUE".to_string()),
                        ("ROLE".to_string(), "REQ-PARTICIPANT".to_string()),
                        ("X-NUM-GUESTS".to_string(), "0".to_string()),
                        ("CUTYPE".to_string(), "INDIVIDUAL".to_string()),
                    ],
                },
            ],
            timezones: vec![],
        }
    }

    fn make_reply(invitation: &Invitation, response: Response) -> Reply {
        let responder = find_responder(&invitation.attendees, &["alice@co.com"]).unwrap();
        Reply::build_at(
            invitation,
            responder,
            response,
            Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_generate_reply_roundtrip() {
        for response in [Response::Accepted, Response::Declined, Response::Tentative] {
            let reply = make_reply(&make_invitation(), response);

            let ics = generate_reply(&reply).unwrap();
            let parsed = parse_invitation(&ics).expect("Should parse generated ICS");

            assert_eq!(parsed.method.as_deref(), Some("REPLY"));
            assert_eq!(parsed.attendees.len(), 1, "ICS:\n{}", ics);
            assert_eq!(parsed.attendees[0].email(), "alice@co.com");
            assert_eq!(parsed.attendees[0].status, Some(response.into()));
            assert_eq!(parsed.uid.as_deref(), Some("sprint-42@co.com"));
            assert_eq!(parsed.organizer_email(), Some("boss@co.com"));
            assert_eq!(parsed.start, reply.start);
        }
    }

    #[test]
    fn test_generate_reply_strips_advisory_parameters() {
        let reply = make_reply(&make_invitation(), Response::Accepted);
        let ics = unfold(&generate_reply(&reply).unwrap());

        let attendee_line = ics
            .lines()
            .find(|l| l.starts_with("ATTENDEE"))
            .expect("Should have ATTENDEE line");

        for param in ["RSVP", "ROLE", "X-NUM-GUESTS", "CUTYPE"] {
            assert!(
                !ics.contains(&format!("{param}=")),
                "{param} should be gone. ICS:\n{}",
                ics
            );
        }
        assert!(attendee_line.contains("PARTSTAT=ACCEPTED"), "Got: {}", attendee_line);
    }

    #[test]
    fn test_generate_reply_without_uid_has_no_uid() {
        let mut invitation = make_invitation();
        invitation.uid = None;
        let reply = make_reply(&invitation, Response::Declined);

        let ics = generate_reply(&reply).unwrap();

        assert!(
            !ics.lines().any(|l| l.starts_with("UID")),
            "Should not invent a UID. ICS:\n{}",
            ics
        );
        assert!(ics.contains("PRODID:-//icsreply//EN"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn test_generate_reply_carries_vtimezone() {
        let mut invitation = make_invitation();
        invitation.start = EventTime::DateTimeZoned {
            datetime: NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            tzid: "Europe/Berlin".to_string(),
        };
        invitation.timezones = vec![TimezoneBlock {
            tzid: "Europe/Berlin".to_string(),
            lines: [
                "BEGIN:VTIMEZONE",
                "TZID:Europe/Berlin",
                "BEGIN:STANDARD",
                "DTSTART:19701025T030000",
                "TZOFFSETFROM:+0200",
                "TZOFFSETTO:+0100",
                "END:STANDARD",
                "END:VTIMEZONE",
            ]
            .map(String::from)
            .to_vec(),
        }];
        let reply = make_reply(&invitation, Response::Accepted);

        let ics = generate_reply(&reply).unwrap();

        let tz_pos = ics.find("BEGIN:VTIMEZONE").expect("Should have VTIMEZONE");
        let event_pos = ics.find("BEGIN:VEVENT").unwrap();
        assert!(tz_pos < event_pos);
        assert!(ics.contains("DTSTART;TZID=Europe/Berlin:20240110T090000"), "ICS:\n{}", ics);
        assert!(ics.contains("DTSTAMP;TZID=Europe/Berlin:20240105T130000"), "ICS:\n{}", ics);

        let parsed = parse_invitation(&ics).expect("Should reparse");
        assert_eq!(parsed.timezones.len(), 1);
        assert_eq!(parsed.start, invitation.start);
    }

    #[test]
    fn test_generate_reply_all_day_event_has_value_date() {
        let mut invitation = make_invitation();
        invitation.start = EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        invitation.end = EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        let reply = make_reply(&invitation, Response::Tentative);

        let ics = generate_reply(&reply).unwrap();

        assert!(ics.contains("DTSTART;VALUE=DATE:20240110"), "ICS:\n{}", ics);
        assert!(ics.contains("DTEND;VALUE=DATE:20240111"), "ICS:\n{}", ics);
    }
}
