//! Finding the user's own attendee record in an invitation.

use crate::error::{ReplyError, ReplyResult};
use crate::event::{Attendee, CalAddress};

/// Get the email address out of an ATTENDEE/ORGANIZER property.
///
/// Prefers the `EMAIL` parameter. Otherwise the value is split on its first
/// colon (`mailto:alice@example.com`, but also `MAILTO:` or other schemes some
/// servers emit); a value without a colon is used as is.
pub fn extract_email(address: &CalAddress) -> &str {
    match address {
        CalAddress::Structured { email, .. } => email.as_str(),
        CalAddress::Uri(value) => value
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(value.as_str()),
    }
}

/// Return the first attendee (in document order) whose email is one of `candidates`.
///
/// Matching is exact and case-sensitive.
pub fn find_responder<'a, S: AsRef<str>>(
    attendees: &'a [Attendee],
    candidates: &[S],
) -> ReplyResult<&'a Attendee> {
    attendees
        .iter()
        .find(|attendee| {
            let email = attendee.email();
            candidates.iter().any(|c| c.as_ref() == email)
        })
        .ok_or_else(|| {
            let wanted: Vec<&str> = candidates.iter().map(|c| c.as_ref()).collect();
            ReplyError::NotInvited(wanted.join(", "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendee(name: &str, address: CalAddress) -> Attendee {
        Attendee {
            name: Some(name.to_string()),
            address,
            status: None,
            params: vec![],
        }
    }

    #[test]
    fn test_both_representations_extract_the_same_email() {
        let structured = CalAddress::Structured {
            email: "foo@x.com".to_string(),
            uri: "urn:uuid:1234".to_string(),
        };
        let uri = CalAddress::Uri("mailto:foo@x.com".to_string());

        assert_eq!(extract_email(&structured), "foo@x.com");
        assert_eq!(extract_email(&uri), "foo@x.com");
    }

    #[test]
    fn test_extract_email_splits_on_first_colon_only() {
        let uri = CalAddress::Uri("MAILTO:odd:name@x.com".to_string());
        assert_eq!(extract_email(&uri), "odd:name@x.com");

        let bare = CalAddress::Uri("plain@x.com".to_string());
        assert_eq!(extract_email(&bare), "plain@x.com");
    }

    #[test]
    fn test_find_responder_matches_any_position() {
        let attendees = vec![
            attendee("Alice", CalAddress::Uri("mailto:alice@co.com".to_string())),
            attendee("Bob", CalAddress::Uri("mailto:bob@co.com".to_string())),
            attendee(
                "Carol",
                CalAddress::Structured {
                    email: "carol@co.com".to_string(),
                    uri: "mailto:carol@co.com".to_string(),
                },
            ),
        ];

        let found = find_responder(&attendees, &["nobody@co.com", "carol@co.com"]).unwrap();
        assert_eq!(found.name.as_deref(), Some("Carol"));

        let found = find_responder(&attendees, &["bob@co.com"]).unwrap();
        assert_eq!(found.name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_find_responder_returns_first_in_document_order() {
        let attendees = vec![
            attendee("Work", CalAddress::Uri("mailto:me@work.com".to_string())),
            attendee("Home", CalAddress::Uri("mailto:me@home.com".to_string())),
        ];

        // Candidate order doesn't matter, document order does
        let found = find_responder(&attendees, &["me@home.com", "me@work.com"]).unwrap();
        assert_eq!(found.name.as_deref(), Some("Work"));
    }

    #[test]
    fn test_find_responder_is_case_sensitive() {
        let attendees = vec![attendee(
            "Alice",
            CalAddress::Uri("mailto:Alice@co.com".to_string()),
        )];

        let err = find_responder(&attendees, &["alice@co.com"]).unwrap_err();
        assert!(matches!(err, ReplyError::NotInvited(ref who) if who == "alice@co.com"));
    }

    #[test]
    fn test_find_responder_without_attendees() {
        let result = find_responder(&[], &["alice@co.com".to_string()]);
        assert!(matches!(result, Err(ReplyError::NotInvited(_))));
    }
}
