//! Messages exchanged with the browser side. One JSON object per message in both directions,
//! answered in the order they arrive.

use std::fmt::Display;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{domain::CategoryOverrides, ledger::entities::VisitEvent};

/// Largest message accepted from the browser.
pub const MAX_MESSAGE_LENGTH: usize = 64 * 1024 * 1024;

/// How messages are delimited on stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Framing {
    /// A 4 byte length in native byte order before every message, as browsers speak to native
    /// messaging hosts.
    NativeMessaging,
    /// One message per line. Handy in a terminal.
    Lines,
}

impl Framing {
    /// Wraps an encoded message for the wire.
    pub fn frame(self, mut message: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            Framing::NativeMessaging => {
                let length = u32::try_from(message.len())
                    .with_context(|| format!("Message of {} bytes is too long", message.len()))?;
                let mut framed = Vec::with_capacity(message.len() + 4);
                framed.extend_from_slice(&length.to_ne_bytes());
                framed.append(&mut message);
                Ok(framed)
            }
            Framing::Lines => {
                message.push(b'\n');
                Ok(message)
            }
        }
    }
}

impl Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framing::NativeMessaging => write!(f, "native-messaging"),
            Framing::Lines => write!(f, "lines"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Request {
    RecordTimeSpent(VisitEvent),
    GetTimeStats,
    ResetTimeStats,
    ReanalyzeFromCategories(CategoryOverrides),
    ResetCategories,
    ResetAll,
}

impl Request {
    pub fn parse(message: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ack() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::{Category, CategoryOverrides};

    use super::{Framing, Request, Response};

    #[test]
    fn parses_record_time_spent() {
        let request = Request::parse(
            br#"{"action":"recordTimeSpent","data":{"url":"https://github.com/x","domain":"github.com","title":"X","timeSpent":12,"timestamp":1700000000000}}"#,
        )
        .unwrap();
        let Request::RecordTimeSpent(event) = request else {
            panic!("unexpected request {request:?}");
        };
        assert_eq!(event.domain, "github.com");
        assert_eq!(event.time_spent, 12);
        assert_eq!(event.timestamp, Some(1_700_000_000_000));
    }

    #[test]
    fn parses_requests_without_data() {
        assert_eq!(
            Request::parse(br#"{"action":"getTimeStats"}"#).unwrap(),
            Request::GetTimeStats
        );
        assert_eq!(
            Request::parse(br#"{"action":"resetTimeStats"}"#).unwrap(),
            Request::ResetTimeStats
        );
    }

    #[test]
    fn parses_category_map() {
        let request = Request::parse(
            br#"{"action":"reanalyzeFromCategories","data":{"a.com":"distracting"}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::ReanalyzeFromCategories(CategoryOverrides::from([(
                "a.com".into(),
                Category::Distracting
            )]))
        );
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!(Request::parse(br#"{"action":"autoGroupTabs"}"#).is_err());
        assert!(Request::parse(b"not json").is_err());
    }

    #[test]
    fn response_shapes() {
        assert_eq!(
            serde_json::to_value(Response::ack()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(Response::failure("Unknown action")).unwrap(),
            json!({"success": false, "error": "Unknown action"})
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(Request::parse(b"\xff\xfe").is_err());
        assert!(Request::parse(b"{\"action\":\"getTimeStats\xff\"}").is_err());
    }

    #[test]
    fn frames_messages() {
        let native = Framing::NativeMessaging.frame(b"{}".to_vec()).unwrap();
        assert_eq!(&native[..4], &2u32.to_ne_bytes());
        assert_eq!(&native[4..], b"{}");
        assert_eq!(Framing::Lines.frame(b"{}".to_vec()).unwrap(), b"{}\n");
    }
}
