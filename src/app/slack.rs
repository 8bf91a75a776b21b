//! Slack delivery for accepted notifications
//!
//! Posts through the `chat.postMessage` Web API with a bot token. There is no
//! retry; a failed request is handed back to the caller.

use reqwest::blocking::Client;
use std::io::Write;
use tracing::{debug, info};

use crate::core::io_traits::{DeliveryResult, DispatchError, MessagePoster};
use crate::core::settings::Settings;

/// Slack Web API message endpoint
pub const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

// =============================================================================
// SLACK POSTER
// =============================================================================

pub struct SlackPoster {
    client: Client,
    url: String,
    token: String,
    channel: String,
}

impl SlackPoster {
    /// Build a poster from the configured credentials
    pub fn new(settings: &Settings) -> Result<Self, DispatchError> {
        Self::with_url(settings, POST_MESSAGE_URL)
    }

    /// Same as `new`, posting to a different endpoint
    pub fn with_url(settings: &Settings, url: &str) -> Result<Self, DispatchError> {
        if settings.slack_key.is_empty() {
            return Err(DispatchError::MissingCredentials("slack_key"));
        }
        if settings.slack_channel.is_empty() {
            return Err(DispatchError::MissingCredentials("slack_channel"));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            token: settings.slack_key.clone(),
            channel: settings.slack_channel.clone(),
        })
    }

    /// Form body for `chat.postMessage`
    fn form<'a>(&'a self, text: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("token", self.token.as_str()),
            ("as_user", "true"),
            ("channel", self.channel.as_str()),
            ("text", text),
        ]
    }
}

impl MessagePoster for SlackPoster {
    fn post(&self, text: &str) -> Result<DeliveryResult, DispatchError> {
        debug!(channel = %self.channel, "[slack] Posting message");

        let response = self
            .client
            .post(&self.url)
            .form(&self.form(text))
            .send()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DispatchError::Transport(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let result: DeliveryResult = response
            .json()
            .map_err(|e| DispatchError::InvalidResponse(e.to_string()))?;

        debug!(ok = result.ok, error = ?result.error, "[slack] Response");
        Ok(result)
    }
}

// =============================================================================
// DRY RUN
// =============================================================================

/// Writes messages to stdout instead of posting them
#[derive(Debug, Default)]
pub struct StdoutPoster;

impl MessagePoster for StdoutPoster {
    fn post(&self, text: &str) -> Result<DeliveryResult, DispatchError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|e| DispatchError::Transport(e.to_string()))?;
        info!("[slack] Dry run, message not posted");
        Ok(DeliveryResult::delivered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GeoPoint;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer one HTTP request with `status` and `body`.
    /// The handle yields the request body that was received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/chat.postMessage", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            let (header_end, content_length) = loop {
                let n = stream.read(&mut buf).unwrap();
                assert!(n > 0, "connection closed before headers");
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    break (end + 4, length);
                }
            };
            while received.len() < header_end + content_length {
                let n = stream.read(&mut buf).unwrap();
                assert!(n > 0, "connection closed before body");
                received.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8(received[header_end..].to_vec()).unwrap()
        });

        (url, handle)
    }

    fn settings(key: &str, channel: &str) -> Settings {
        Settings::new(GeoPoint::new(0.0, 0.0), key, channel)
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            SlackPoster::new(&settings("", "#alerts")),
            Err(DispatchError::MissingCredentials("slack_key"))
        ));
        assert!(matches!(
            SlackPoster::new(&settings("xoxb-1", "")),
            Err(DispatchError::MissingCredentials("slack_channel"))
        ));
    }

    #[test]
    fn test_form_fields() {
        let poster = SlackPoster::new(&settings("xoxb-1", "#alerts")).unwrap();
        let form = poster.form("Dratini is nearby");
        assert_eq!(
            form,
            [
                ("token", "xoxb-1"),
                ("as_user", "true"),
                ("channel", "#alerts"),
                ("text", "Dratini is nearby"),
            ]
        );
    }

    #[test]
    fn test_post_sends_form_and_reads_ok_response() {
        let (url, server) = serve_once("200 OK", r#"{"ok": true, "channel": "C1", "ts": "1.2"}"#);
        let poster = SlackPoster::with_url(&settings("xoxb-1", "#a b"), &url).unwrap();

        let result = poster.post("Mew is nearby & 3:45PM").unwrap();
        assert_eq!(result, DeliveryResult::delivered());
        assert_eq!(
            server.join().unwrap(),
            "token=xoxb-1&as_user=true&channel=%23a+b&text=Mew+is+nearby+%26+3%3A45PM"
        );
    }

    #[test]
    fn test_post_returns_service_rejection() {
        let (url, server) = serve_once("200 OK", r#"{"ok": false, "error": "invalid_auth"}"#);
        let poster = SlackPoster::with_url(&settings("xoxb-1", "#alerts"), &url).unwrap();

        assert_eq!(
            poster.post("Mew is nearby").unwrap(),
            DeliveryResult {
                ok: false,
                error: Some("invalid_auth".to_string()),
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_post_non_json_body_is_invalid_response() {
        let (url, server) = serve_once("200 OK", "<html>oops</html>");
        let poster = SlackPoster::with_url(&settings("xoxb-1", "#alerts"), &url).unwrap();

        assert!(matches!(
            poster.post("Mew is nearby"),
            Err(DispatchError::InvalidResponse(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_post_http_error_status_is_transport_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");
        let poster = SlackPoster::with_url(&settings("xoxb-1", "#alerts"), &url).unwrap();

        match poster.post("Mew is nearby") {
            Err(DispatchError::Transport(msg)) => assert!(msg.contains("500"), "{msg}"),
            other => panic!("expected transport error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let poster =
            SlackPoster::with_url(&settings("xoxb-1", "#alerts"), "http://127.0.0.1:9/api").unwrap();
        assert!(matches!(
            poster.post("hello"),
            Err(DispatchError::Transport(_))
        ));
    }

    #[test]
    fn test_stdout_poster_always_delivers() {
        assert_eq!(
            StdoutPoster.post("Mew is nearby").unwrap(),
            DeliveryResult::delivered()
        );
    }
}
