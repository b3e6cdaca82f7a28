use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};

use super::*;

fn settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
        calendar: CalendarConfig {
            route: "calendar".to_string(),
            clean_events: true,
            strict_parsing: false,
            max_body_bytes: 1024,
            seed_file: None,
        },
    }
}

#[handler]
async fn echo_route(res: &mut Response, depot: &mut Depot) {
    match get_config_from_depot(depot) {
        Ok(settings) => res.render(settings.calendar.route.clone()),
        Err(e) => {
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(e.to_string());
        }
    }
}

#[test_log::test(tokio::test)]
async fn config_handler_injects_settings() {
    let router = Router::new()
        .hoop(ConfigHandler {
            settings: settings(),
        })
        .push(Router::with_path("echo").get(echo_route));
    let service = Service::new(router);

    let mut resp = TestClient::get("http://127.0.0.1:5800/echo")
        .send(&service)
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::OK));
    assert_eq!(resp.take_string().await.unwrap(), "calendar");
}

#[test_log::test(tokio::test)]
async fn missing_config_is_reported() {
    let service = Service::new(Router::with_path("echo").get(echo_route));

    let mut resp = TestClient::get("http://127.0.0.1:5800/echo")
        .send(&service)
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(
        resp.take_string()
            .await
            .unwrap()
            .contains("Configuration not found")
    );
}
