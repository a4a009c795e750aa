//! Control-plane request/response bodies (UTF-8 JSON over HTTP).

use serde::{Deserialize, Serialize};

/// Body of `POST /open-url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenUrlRequest {
    pub token: String,
    pub url: String,
}

/// Generic control-plane reply envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ControlReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            token: None,
        }
    }

    pub fn ok_with_token(token: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: None,
            token: Some(token.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            token: None,
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_omits_absent_fields() {
        let json = serde_json::to_string(&ControlReply::ok_with_token("abcd")).unwrap();
        assert_eq!(json, r#"{"ok":true,"token":"abcd"}"#);

        let json = serde_json::to_string(&ControlReply::denied()).unwrap();
        assert_eq!(json, r#"{"ok":false}"#);
    }
}
