//! Minimal HTTP surface for the dashboard.
//!
//! One blocking accept loop, request-line routing only. The dashboard is
//! read-only; every route is a GET and state changes are expressed purely
//! through the URL query string, so back/forward and deep links need no
//! server-side session.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use anyhow::Result;

use crate::app::App;
use crate::logging::{log, obj, v_str, Domain, Level};

pub struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn ok(content_type: &'static str, body: String) -> Self {
        Self { status: "200 OK", content_type, body }
    }

    fn not_found() -> Self {
        Self {
            status: "404 NOT FOUND",
            content_type: "text/plain",
            body: "Not Found".to_string(),
        }
    }
}

/// Split a request line like `GET /path?query HTTP/1.1` into path and query.
pub fn parse_request_line(line: &str) -> Option<(String, String)> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;
    match target.split_once('?') {
        Some((path, query)) => Some((path.to_string(), query.to_string())),
        None => Some((target.to_string(), String::new())),
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Route a GET request. Unknown paths 404; the dashboard page itself never
/// 404s on bad query values because unknown view names fall back to
/// defaults and missing ids render the not-found view.
pub fn route(app: &mut App, path: &str, query: &str) -> Response {
    match path {
        "/" | "/index.html" => Response::ok("text/html; charset=utf-8", app.page(query)),
        "/healthz" => Response::ok("application/json", r#"{"status":"ok"}"#.to_string()),
        "/api/stats" => Response::ok("application/json", app.stats_json()),
        "/api/search" => {
            let q = query_param(query, "q").unwrap_or_default();
            Response::ok("application/json", app.search_json(&q))
        }
        "/api/export" => {
            let section = query_param(query, "section").unwrap_or_default();
            Response::ok("application/json", app.export_json(&section))
        }
        _ => Response::not_found(),
    }
}

/// Blocking accept loop. Each connection is handled to completion before
/// the next is accepted, which is all a single-operator dashboard needs.
pub fn run(mut app: App, listen_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(listen_addr)?;
    log(
        Level::Info,
        Domain::System,
        "server_started",
        obj(&[("addr", v_str(listen_addr))]),
    );

    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(s) => s,
            Err(_) => continue,
        };

        let request_line = BufReader::new(&stream).lines().next();
        let request = match request_line {
            Some(Ok(line)) => line,
            _ => continue,
        };

        let response = match parse_request_line(&request) {
            Some((path, query)) => {
                log(
                    Level::Debug,
                    Domain::Http,
                    "request",
                    obj(&[("path", v_str(&path)), ("query", v_str(&query))]),
                );
                route(&mut app, &path, &query)
            }
            None => Response::not_found(),
        };

        let raw = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
            response.status,
            response.content_type,
            response.body.len(),
            response.body
        );
        let _ = stream.write_all(raw.as_bytes());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::retry::RetryConfig;

    #[test]
    fn parses_request_lines() {
        assert_eq!(
            parse_request_line("GET /?view=course HTTP/1.1"),
            Some(("/".to_string(), "view=course".to_string()))
        );
        assert_eq!(
            parse_request_line("GET /healthz HTTP/1.1"),
            Some(("/healthz".to_string(), String::new()))
        );
        assert_eq!(parse_request_line("POST / HTTP/1.1"), None);
        assert_eq!(parse_request_line(""), None);
    }

    #[test]
    fn routes_health_and_404() {
        let mut app = App::without_cache(RetryConfig { max_retries: 0, base_delay_ms: 1 });
        let health = route(&mut app, "/healthz", "");
        assert_eq!(health.status, "200 OK");
        assert!(health.body.contains("ok"));

        let missing = route(&mut app, "/nope", "");
        assert_eq!(missing.status, "404 NOT FOUND");
    }

    #[test]
    fn dashboard_route_renders_html() {
        let mut app = App::without_cache(RetryConfig { max_retries: 0, base_delay_ms: 1 });
        let response = route(&mut app, "/", "view=general");
        assert_eq!(response.content_type, "text/html; charset=utf-8");
        assert!(response.body.contains("dashboard-content"));
    }

    #[test]
    fn search_route_reads_query_param() {
        let mut app = App::without_cache(RetryConfig { max_retries: 0, base_delay_ms: 1 });
        let response = route(&mut app, "/api/search", "q=logic");
        assert_eq!(response.content_type, "application/json");
        assert!(response.body.contains("\"count\":0"));
    }
}
