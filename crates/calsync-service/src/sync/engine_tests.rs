use std::sync::{Arc, Mutex};

use calsync_rfc::rfc::ical::core::{Component, CompactValue, EventJson};
use calsync_rfc::rfc::ical::parse::parse;

use super::{CalendarSync, ChangeKind, EventChange};
use crate::error::ServiceError;

type Recorded = Arc<Mutex<Vec<EventChange>>>;

fn recording(sync: &mut CalendarSync) -> Recorded {
    let recorded: Recorded = Arc::default();
    let sink = Arc::clone(&recorded);
    sync.subscribe(move |change: &EventChange| {
        sink.lock().unwrap().push(change.clone());
    });
    recorded
}

fn kinds(changes: &[EventChange]) -> Vec<(ChangeKind, String)> {
    changes
        .iter()
        .map(|c| (c.kind, c.event.uid().unwrap_or_default().to_string()))
        .collect()
}

fn calendar_text(events: &[&str]) -> String {
    let mut text = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
    for event in events {
        text.push_str("BEGIN:VEVENT\r\n");
        text.push_str(event);
        text.push_str("END:VEVENT\r\n");
    }
    text.push_str("END:VCALENDAR\r\n");
    text
}

const U1: &str = "UID:U1\r\n\
                  SUMMARY:Test\r\n\
                  DTSTART;TZID=Europe/Berlin:20140903T110000\r\n\
                  DTEND;TZID=Europe/Berlin:20140903T120000\r\n";

const U1_CHANGED: &str = "UID:U1\r\n\
                          SUMMARY:Changed\r\n\
                          DTSTART;TZID=Europe/Berlin:20140903T110000\r\n\
                          DTEND;TZID=Europe/Berlin:20140903T120000\r\n";

const U2: &str = "UID:U2\r\n\
                  SUMMARY:Other\r\n\
                  DTSTART:20140905T210000Z\r\n";

fn event_json(id: &str, uid: &str, description: &str) -> EventJson {
    EventJson {
        id: Some(id.to_string()),
        same_as: Some(CompactValue::from(uid)),
        start_date: Some(CompactValue::from("2014-09-03T11:00:00+02:00")),
        end_date: Some(CompactValue::from("2014-09-03T12:00:00+02:00")),
        description: Some(CompactValue::from(description)),
        ..EventJson::default()
    }
}

#[test_log::test]
fn merge_adds_new_event_with_normalized_start() {
    let mut sync = CalendarSync::default();
    let recorded = recording(&mut sync);

    let changes = sync.apply_text(&calendar_text(&[U1])).unwrap();

    assert_eq!(kinds(&changes), vec![(ChangeKind::Added, "U1".to_string())]);
    assert_eq!(*recorded.lock().unwrap(), changes);

    let events: Vec<_> = sync.events().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].first_property_value("DTSTART"),
        Some("2014-09-03T09:00:00.000Z")
    );
}

#[test_log::test]
fn add_event_normalizes_offsets_and_notifies() {
    let mut sync = CalendarSync::default();
    let recorded = recording(&mut sync);

    let change = sync
        .add_event(&event_json("http://example.org/e1#event", "U1", "Test"))
        .unwrap();

    assert_eq!(change.kind, ChangeKind::Added);
    assert_eq!(recorded.lock().unwrap().len(), 1);
    assert_eq!(
        sync.calendar().find_event("U1").unwrap().start_date(),
        Some(CompactValue::from("2014-09-03T09:00:00.000Z"))
    );
}

#[test_log::test]
fn merge_updates_changed_event_and_keeps_external_id() {
    let mut sync = CalendarSync::default();
    sync.add_event(&event_json("http://example.org/e1#event", "U1", "Test"))
        .unwrap();
    let recorded = recording(&mut sync);

    let changes = sync.apply_text(&calendar_text(&[U1_CHANGED])).unwrap();

    assert_eq!(kinds(&changes), vec![(ChangeKind::Updated, "U1".to_string())]);
    assert_eq!(recorded.lock().unwrap().len(), 1);

    let event = sync.calendar().find_event("U1").unwrap();
    assert_eq!(
        event.external_id.as_deref(),
        Some("http://example.org/e1#event")
    );
    assert_eq!(event.summary(), Some(CompactValue::from("Changed")));
}

#[test_log::test]
fn merge_keeps_external_id_of_unchanged_event() {
    let mut sync = CalendarSync::default();
    sync.add_event(&event_json("http://example.org/e1#event", "U1", "Test"))
        .unwrap();

    let changes = sync.apply_text(&calendar_text(&[U1])).unwrap();

    assert!(changes.is_empty());
    assert_eq!(
        sync.calendar().find_event("U1").unwrap().external_id.as_deref(),
        Some("http://example.org/e1#event")
    );
}

#[test_log::test]
fn merge_removes_missing_events() {
    let mut sync = CalendarSync::default();
    sync.apply_text(&calendar_text(&[U1, U2])).unwrap();
    let recorded = recording(&mut sync);

    let changes = sync.apply_text(&calendar_text(&[U1])).unwrap();

    assert_eq!(kinds(&changes), vec![(ChangeKind::Removed, "U2".to_string())]);
    assert_eq!(recorded.lock().unwrap().len(), 1);
    assert!(sync.calendar().find_event("U2").is_none());
}

#[test_log::test]
fn merging_twice_is_silent() {
    let mut sync = CalendarSync::default();
    let text = calendar_text(&[U1, U2]);

    assert_eq!(sync.apply_text(&text).unwrap().len(), 2);
    let recorded = recording(&mut sync);

    assert!(sync.apply_text(&text).unwrap().is_empty());
    assert!(recorded.lock().unwrap().is_empty());
}

#[test_log::test]
fn unrecognized_properties_do_not_trigger_updates() {
    let mut sync = CalendarSync::default().with_clean_events(false);
    sync.apply_text(&calendar_text(&[U1])).unwrap();

    let noisy = format!("{U1}X-NOISE:first\r\nDESCRIPTION:long text\r\n");
    let changes = sync.apply_text(&calendar_text(&[noisy.as_str()])).unwrap();

    assert!(changes.is_empty());
    let event = sync.calendar().find_event("U1").unwrap();
    assert_eq!(event.first_property_value("X-NOISE"), Some("first"));
}

#[test_log::test]
fn clean_mode_stores_simplified_events() {
    let mut sync = CalendarSync::default();
    let noisy = format!("{U1}X-NOISE:first\r\n");
    sync.apply_text(&calendar_text(&[noisy.as_str()])).unwrap();

    let event = sync.calendar().find_event("U1").unwrap();
    assert!(!event.properties.contains("X-NOISE"));
    assert_eq!(event.summary(), Some(CompactValue::from("Test")));
}

#[test_log::test]
fn calendar_properties_are_replaced_and_other_children_kept() {
    let mut sync = CalendarSync::default();
    let text = "BEGIN:VCALENDAR\r\n\
                PRODID:-//Other//EN\r\n\
                X-WR-TIMEZONE:Europe/Berlin\r\n\
                BEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nEND:VTIMEZONE\r\n\
                BEGIN:VEVENT\r\nUID:U1\r\nEND:VEVENT\r\n\
                END:VCALENDAR\r\n";

    sync.apply_text(text).unwrap();

    let calendar = sync.calendar();
    assert_eq!(calendar.first_property_value("PRODID"), Some("-//Other//EN"));
    assert!(!calendar.properties.contains("VERSION"));
    assert!(!calendar.properties.contains("X-WR-TIMEZONE"));
    assert_eq!(calendar.children.len(), 2);
    assert_eq!(calendar.children[0].name, "VTIMEZONE");
}

#[test_log::test]
fn incoming_event_without_uid_receives_one() {
    let mut sync = CalendarSync::default();
    let changes = sync
        .apply_text(&calendar_text(&["SUMMARY:No id\r\n"]))
        .unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Added);
    let uid = changes[0].event.uid().unwrap();
    assert!(uuid::Uuid::parse_str(uid).is_ok());
    assert!(sync.calendar().find_event(uid).is_some());
}

#[test_log::test]
fn duplicate_canonical_uid_keeps_later_event() {
    let mut calendar = Component::new_calendar("-//Test//EN");
    for summary in ["first", "second"] {
        let mut event = Component::event();
        event.set_uid("U1");
        event.set_summary(CompactValue::from(summary));
        calendar.add_child(event);
    }
    let mut sync = CalendarSync::new(calendar);

    let text = calendar_text(&["UID:U1\r\nSUMMARY:second\r\n"]);
    let changes = sync.apply_text(&text).unwrap();

    assert!(changes.is_empty());
    assert_eq!(sync.events().count(), 1);
}

#[test_log::test]
fn malformed_text_leaves_calendar_untouched() {
    let mut sync = CalendarSync::default();
    sync.apply_text(&calendar_text(&[U1])).unwrap();
    let before = sync.calendar().clone();
    let recorded = recording(&mut sync);

    let err = sync
        .apply_text("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART:yesterday\r\n")
        .unwrap_err();
    assert!(matches!(err, ServiceError::RfcError(_)));

    let err = sync
        .apply_text("BEGIN:VCALENDAR\r\nthis line has no colon\r\nEND:VCALENDAR\r\n")
        .unwrap_err();
    assert!(matches!(err, ServiceError::RfcError(_)));

    assert_eq!(sync.calendar(), &before);
    assert!(recorded.lock().unwrap().is_empty());
}

#[test_log::test]
fn unknown_timezone_leaves_calendar_untouched() {
    let mut sync = CalendarSync::default();
    sync.apply_text(&calendar_text(&[U1])).unwrap();
    let before = sync.calendar().clone();

    let text = calendar_text(&["UID:U3\r\nDTSTART;TZID=Nowhere/Special:20140903T110000\r\n"]);
    assert!(sync.apply_text(&text).is_err());
    assert_eq!(sync.calendar(), &before);
}

#[test_log::test]
fn empty_document_is_rejected() {
    let mut sync = CalendarSync::default();
    assert!(matches!(
        sync.apply_text("\r\n").unwrap_err(),
        ServiceError::EmptyDocument
    ));
}

#[test_log::test]
fn non_calendar_root_is_rejected() {
    let mut sync = CalendarSync::default();
    let before = sync.calendar().clone();

    let err = sync
        .apply_text("BEGIN:VEVENT\r\nUID:U1\r\nEND:VEVENT\r\n")
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidDocument(_)));
    assert_eq!(sync.calendar(), &before);
}

#[test_log::test]
fn strict_parsing_rejects_mismatched_end() {
    let mut sync = CalendarSync::default().with_parse_options(
        calsync_rfc::rfc::ical::parse::ParseOptions::strict(),
    );
    let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:U1\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";

    assert!(sync.apply_text(text).is_err());
    assert_eq!(sync.events().count(), 0);
}

fn panicking_observer(_change: &EventChange) {
    panic!("observer failure");
}

#[test_log::test]
fn panicking_observer_does_not_break_merge() {
    let mut sync = CalendarSync::default();
    sync.subscribe(panicking_observer);
    let recorded = recording(&mut sync);

    let changes = sync.apply_text(&calendar_text(&[U1, U2])).unwrap();

    assert_eq!(changes.len(), 2);
    assert_eq!(recorded.lock().unwrap().len(), 2);
    assert_eq!(sync.events().count(), 2);
}

#[test_log::test]
fn serialized_calendar_reapplies_without_changes() {
    let mut sync = CalendarSync::default();
    sync.apply_text(&calendar_text(&["UID:U2\r\nDTSTART;VALUE=DATE:20140116\r\n"]))
        .unwrap();
    sync.add_event(&EventJson {
        same_as: Some(CompactValue::from("U1")),
        start_date: Some(CompactValue::from("2014-09-03T11:00:00.500+02:00")),
        ..EventJson::default()
    })
    .unwrap();
    let recorded = recording(&mut sync);

    let text = sync.to_text().unwrap();
    let changes = sync.apply_text(&text).unwrap();

    assert!(changes.is_empty(), "unexpected changes: {:?}", kinds(&changes));
    assert!(recorded.lock().unwrap().is_empty());
}

#[test_log::test]
fn to_text_parses_back_to_canonical_calendar() {
    let mut sync = CalendarSync::default();
    sync.apply_text(&calendar_text(&[U1, U2])).unwrap();

    let text = sync.to_text().unwrap();
    let reparsed = parse(&text).unwrap().unwrap();

    assert_eq!(&reparsed, sync.calendar());
}
