/// Default path segment the canonical calendar is served under.
pub const CALENDAR_ROUTE_COMPONENT: &str = "calendar";
pub const CALENDAR_ROUTE_PREFIX: &str = const_str::concat!("/", CALENDAR_ROUTE_COMPONENT);

/// Media type of iCalendar bodies.
pub const TEXT_CALENDAR_CONTENT_TYPE: &str = "text/calendar";
pub const TEXT_CALENDAR_UTF8_CONTENT_TYPE: &str =
    const_str::concat!(TEXT_CALENDAR_CONTENT_TYPE, "; charset=utf-8");

/// PRODID written on calendars created from scratch.
pub const DEFAULT_PRODID: &str = "-//calsync//calsync calendar sync//EN";

/// Default limit for PUT bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1_048_576;
