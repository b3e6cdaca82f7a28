//! Shared setup for calendar handler tests.

use std::sync::Arc;

use salvo::http::ReqBody;
use salvo::http::header::CONTENT_TYPE;
use salvo::prelude::*;
use salvo::test::TestClient;
use tokio::sync::RwLock;

use calsync_core::constants::{CALENDAR_ROUTE_PREFIX, TEXT_CALENDAR_CONTENT_TYPE};
use calsync_service::sync::CalendarSync;

use crate::app::api::routes;
use crate::config::{CalendarConfig, ConfigHandler, LoggingConfig, ServerConfig, Settings};
use crate::middleware::calendar::{CalendarHandler, SharedCalendar};

pub fn calendar_url() -> String {
    format!("http://127.0.0.1:5800{CALENDAR_ROUTE_PREFIX}")
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        calendar: CalendarConfig {
            route: "calendar".to_string(),
            clean_events: true,
            strict_parsing: false,
            max_body_bytes: 4096,
            seed_file: None,
        },
    }
}

pub fn shared_calendar() -> SharedCalendar {
    Arc::new(RwLock::new(CalendarSync::default()))
}

pub fn service_for(store: &SharedCalendar) -> Service {
    let settings = test_settings();
    let router = Router::new()
        .hoop(ConfigHandler {
            settings: settings.clone(),
        })
        .hoop(CalendarHandler {
            store: Arc::clone(store),
        })
        .push(routes(&settings));
    Service::new(router)
}

pub async fn put_calendar(service: &Service, text: &str) -> Response {
    TestClient::put(calendar_url())
        .add_header(CONTENT_TYPE, TEXT_CALENDAR_CONTENT_TYPE, true)
        .body(ReqBody::Once(text.as_bytes().to_vec().into()))
        .send(service)
        .await
}

pub fn calendar_text(events: &[&str]) -> String {
    let mut text = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
    for event in events {
        text.push_str("BEGIN:VEVENT\r\n");
        text.push_str(event);
        text.push_str("END:VEVENT\r\n");
    }
    text.push_str("END:VCALENDAR\r\n");
    text
}
