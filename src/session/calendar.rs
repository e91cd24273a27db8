//! iCalendar export of booked sessions.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use cragclub_shared::session::Session;

pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const CONTENT_DISPOSITION: &str = "attachment; filename=\"climbing-sessions.ics\"";

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Every event lasts this long.
const EVENT_HOURS: i64 = 2;

/// Start of a session in UTC. An empty time means midnight.
fn start_of(session: &Session) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(session.date.trim(), "%Y-%m-%d").ok()?;
    let time = match session.time.trim() {
        "" => NaiveTime::from_hms_opt(0, 0, 0)?,
        t => NaiveTime::parse_from_str(t, "%H:%M").ok()?,
    };
    Some(date.and_time(time).and_utc())
}

/// Escapes a TEXT value.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Renders the calendar of `user_id`.
///
/// Sessions with an unreadable date or time are left out.
pub fn render(sessions: &[Session], user_id: &str, domain: &str, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_owned(),
        "VERSION:2.0".to_owned(),
        "PRODID:-//CLUB//Calendar//EN".to_owned(),
    ];
    let stamp = now.format(STAMP_FORMAT).to_string();

    for session in sessions {
        let Some(start) = start_of(session) else {
            tracing::warn!(
                "session {} skipped in calendar: unreadable date \"{} {}\"",
                session.id,
                session.date,
                session.time
            );
            continue;
        };
        lines.extend([
            "BEGIN:VEVENT".to_owned(),
            format!("UID:{}_{}@{}", session.id, user_id, domain),
            format!("DTSTAMP:{stamp}"),
            format!("DTSTART:{}", start.format(STAMP_FORMAT)),
            format!("DTEND:{}", (start + Duration::hours(EVENT_HOURS)).format(STAMP_FORMAT)),
            format!(
                "SUMMARY:{}",
                escape(&format!("{} ({})", session.title, session.session_type))
            ),
            "END:VEVENT".to_owned(),
        ]);
    }
    lines.push("END:VCALENDAR".to_owned());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn session(id: i64, date: &str, time: &str) -> Session {
        Session {
            id,
            session_type: "indoor".to_owned(),
            title: "Wall night, lead".to_owned(),
            date: date.to_owned(),
            time: time.to_owned(),
            capacity: 10,
            booked_slots: 1,
            required_membership: "basic".to_owned(),
        }
    }

    #[test]
    fn events() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        let ics = render(
            &[
                session(3, "2026-10-05", "18:30"),
                session(4, "next tuesday", "18:30"),
                session(5, "2026-10-06", ""),
            ],
            "u1",
            "climb.test",
            now,
        );

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//CLUB//Calendar//EN\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("UID:3_u1@climb.test\r\n"));
        assert!(ics.contains("DTSTAMP:20261001T120000Z\r\n"));
        assert!(ics.contains("DTSTART:20261005T183000Z\r\nDTEND:20261005T203000Z\r\n"));
        assert!(ics.contains("SUMMARY:Wall night\\, lead (indoor)\r\n"));
        assert!(ics.contains("DTSTART:20261006T000000Z\r\n"));
        assert!(!ics.contains("UID:4_"));
    }

    #[test]
    fn empty_calendar() {
        let ics = render(&[], "u1", "climb.test", Utc::now());
        assert_eq!(ics.matches("VEVENT").count(), 0);
        assert_eq!(ics.lines().count(), 4);
    }
}
