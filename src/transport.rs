//! HTTP transport for the lamp's config API.
//!
//! Writes: POST http://{host}/chngConfig with a JSON body, reply body `OK`.
//! Reads:  GET  http://{host}/getConfig, reply is the full config as JSON.

use crate::error::{LampError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;

/// Timeout applied to every request; the lamp API has no other bound
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Request body for changing the lamp config. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i16>,
    #[serde(rename = "whiteTemp", skip_serializing_if = "Option::is_none")]
    pub white_temp: Option<u8>,
    #[serde(rename = "R", skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>,
    #[serde(rename = "G", skip_serializing_if = "Option::is_none")]
    pub g: Option<u8>,
    #[serde(rename = "B", skip_serializing_if = "Option::is_none")]
    pub b: Option<u8>,
}

/// Config as reported by the lamp. There is no power field.
///
/// Numbers may arrive as JSON floats; they are truncated toward zero and
/// saturate at the `i32` bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    #[serde(deserialize_with = "truncated")]
    pub brightness: i32,
    #[serde(rename = "whiteTemp", deserialize_with = "truncated")]
    pub white_temp: i32, // 0-100, 100 = warmest
    #[serde(rename = "R", deserialize_with = "truncated")]
    pub r: i32,
    #[serde(rename = "G", deserialize_with = "truncated")]
    pub g: i32,
    #[serde(rename = "B", deserialize_with = "truncated")]
    pub b: i32,
}

fn truncated<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value as i32)
}

/// Raw request/response exchange with the lamp.
///
/// Implementations only move bytes; checking the `OK` reply and decoding the
/// config belong to the caller.
pub trait Transport {
    /// POST `change` as JSON and return the response body
    fn post(&self, url: &str, change: &ConfigChange) -> Result<String>;

    /// GET `url` and return the response body
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with the fixed 2 second timeout
    pub fn new() -> Result<Self> {
        // The lamp lives on the local network; never route it through a proxy
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| LampError::Communication(format!("Could not create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, change: &ConfigChange) -> Result<String> {
        let response = self.client.post(url).json(change).send().map_err(|e| {
            debug!(url, error = %e, "POST to lamp failed");
            LampError::connection()
        })?;

        response.text().map_err(|e| {
            debug!(url, error = %e, "Failed to read lamp response");
            LampError::connection()
        })
    }

    fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().map_err(|e| {
            debug!(url, error = %e, "GET from lamp failed");
            LampError::connection()
        })?;

        response.text().map_err(|e| {
            debug!(url, error = %e, "Failed to read lamp response");
            LampError::connection()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Accept one connection, answer it with `body`, return the raw request
    fn serve_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let host = listener.local_addr().unwrap().to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (host, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn closed_port_host() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    }

    #[test]
    fn test_config_change_skips_unset_fields() {
        let change = ConfigChange {
            white_temp: Some(25),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&change).unwrap(), r#"{"whiteTemp":25}"#);

        let change = ConfigChange {
            brightness: Some(-1),
            r: Some(1),
            g: Some(2),
            b: Some(3),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&change).unwrap(),
            r#"{"brightness":-1,"R":1,"G":2,"B":3}"#
        );
    }

    #[test]
    fn test_device_config_parsing() {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"brightness":50,"whiteTemp":25,"R":10,"G":20,"B":30}"#).unwrap();
        assert_eq!(config.brightness, 50);
        assert_eq!(config.white_temp, 25);
        assert_eq!((config.r, config.g, config.b), (10, 20, 30));
    }

    #[test]
    fn test_device_config_accepts_floats() {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"brightness":50.0,"whiteTemp":25.7,"R":-0.5,"G":1e12,"B":30}"#)
                .unwrap();
        assert_eq!(config.brightness, 50);
        assert_eq!(config.white_temp, 25);
        assert_eq!(config.r, 0);
        assert_eq!(config.g, i32::MAX);
        assert_eq!(config.b, 30);
    }

    #[test]
    fn test_device_config_rejects_non_numbers() {
        let result: serde_json::Result<DeviceConfig> =
            serde_json::from_str(r#"{"brightness":"high","whiteTemp":25,"R":1,"G":2,"B":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_post_sends_json_and_returns_body() {
        let (host, server) = serve_once("OK");
        let transport = HttpTransport::new().unwrap();
        let change = ConfigChange {
            brightness: Some(49),
            ..Default::default()
        };

        let body = transport
            .post(&format!("http://{}/chngConfig", host), &change)
            .unwrap();
        assert_eq!(body, "OK");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /chngConfig HTTP/1.1"));
        assert!(request.ends_with(r#"{"brightness":49}"#));
    }

    #[test]
    fn test_get_returns_body() {
        let (host, server) = serve_once(r#"{"brightness":1,"whiteTemp":2,"R":3,"G":4,"B":5}"#);
        let transport = HttpTransport::new().unwrap();

        let body = transport.get(&format!("http://{}/getConfig", host)).unwrap();
        assert!(body.contains(r#""whiteTemp":2"#));

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /getConfig HTTP/1.1"));
    }

    #[test]
    fn test_silent_lamp_times_out_after_two_seconds() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(2));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let host = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            // Hold the connection open without answering
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(4));
            drop(stream);
        });

        let transport = HttpTransport::new().unwrap();
        let started = std::time::Instant::now();
        let err = transport
            .get(&format!("http://{}/getConfig", host))
            .unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(err, LampError::connection());
        assert!(elapsed >= Duration::from_millis(1900), "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3900), "returned after {:?}", elapsed);
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_lamp_is_connection_error() {
        let host = closed_port_host();
        let transport = HttpTransport::new().unwrap();

        let err = transport
            .get(&format!("http://{}/getConfig", host))
            .unwrap_err();
        assert_eq!(err, LampError::connection());
        assert_eq!(err.to_string(), "Could not connect to lamp.");

        let err = transport
            .post(&format!("http://{}/chngConfig", host), &ConfigChange::default())
            .unwrap_err();
        assert_eq!(err, LampError::connection());
    }
}
