//! Out-of-band pairing exchange payload.
//!
//! The display renders this payload as a scannable code; the sender parses
//! it to save a pairing record. Two equivalent encodings are accepted: a
//! JSON object `{ip, port, token}` and the URI form
//! `navlink://pair?ip=..&port=..&token=..`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// URI scheme used by the pairing deep link.
pub const PAIRING_SCHEME: &str = "navlink";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,

    #[error("unrecognized pairing payload")]
    Unrecognized,

    #[error("pairing payload is missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid port in pairing payload: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPayload {
    pub ip: String,
    pub port: u16,
    pub token: String,
}

impl PairingPayload {
    pub fn new(ip: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            token: token.into(),
        }
    }

    /// Parse either encoding. JSON is tried first, then the URI form.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PayloadError::Empty);
        }
        if let Ok(payload) = serde_json::from_str::<PairingPayload>(raw) {
            return payload.validated();
        }
        Self::parse_uri(raw)?.validated()
    }

    fn parse_uri(raw: &str) -> Result<Self, PayloadError> {
        let uri = Url::parse(raw).map_err(|_| PayloadError::Unrecognized)?;
        if uri.scheme() != PAIRING_SCHEME {
            return Err(PayloadError::Unrecognized);
        }

        let mut ip = None;
        let mut port = None;
        let mut token = None;
        for (key, value) in uri.query_pairs() {
            match key.as_ref() {
                "ip" => ip = Some(value.into_owned()),
                "port" => port = Some(value.into_owned()),
                "token" => token = Some(value.into_owned()),
                _ => {}
            }
        }

        let ip = ip.ok_or(PayloadError::MissingField("ip"))?;
        let port = port.ok_or(PayloadError::MissingField("port"))?;
        let token = token.ok_or(PayloadError::MissingField("token"))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| PayloadError::InvalidPort(port))?;

        Ok(Self { ip, port, token })
    }

    fn validated(self) -> Result<Self, PayloadError> {
        if self.ip.is_empty() {
            return Err(PayloadError::MissingField("ip"));
        }
        if self.token.is_empty() {
            return Err(PayloadError::MissingField("token"));
        }
        Ok(self)
    }

    /// JSON encoding, used as the QR payload body.
    pub fn to_json(&self) -> String {
        // A struct of three plain fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deep-link encoding of the same fields.
    pub fn to_uri(&self) -> String {
        format!(
            "{}://pair?ip={}&port={}&token={}",
            PAIRING_SCHEME, self.ip, self.port, self.token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_form() {
        let payload =
            PairingPayload::parse(r#"{"ip":"192.168.1.40","port":8765,"token":"abcd1234"}"#)
                .unwrap();
        assert_eq!(payload.ip, "192.168.1.40");
        assert_eq!(payload.port, 8765);
        assert_eq!(payload.token, "abcd1234");
    }

    #[test]
    fn parses_uri_form() {
        let payload =
            PairingPayload::parse("navlink://pair?ip=192.168.1.40&port=8765&token=abcd1234")
                .unwrap();
        assert_eq!(payload.ip, "192.168.1.40");
        assert_eq!(payload.port, 8765);
        assert_eq!(payload.token, "abcd1234");
    }

    #[test]
    fn round_trips_through_both_encodings() {
        let payload = PairingPayload::new("10.0.0.7", 9000, "ef567890ef567890ef567890");
        assert_eq!(PairingPayload::parse(&payload.to_json()).unwrap(), payload);
        assert_eq!(PairingPayload::parse(&payload.to_uri()).unwrap(), payload);
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert!(PairingPayload::parse("").is_err());
        assert!(PairingPayload::parse("not a payload").is_err());
        assert!(PairingPayload::parse("http://example.com/?ip=1&port=2&token=3").is_err());
        assert!(PairingPayload::parse("navlink://pair?ip=1.2.3.4&port=99999&token=t").is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            PairingPayload::parse("navlink://pair?port=8765&token=abcd"),
            Err(PayloadError::MissingField("ip"))
        ));
        assert!(matches!(
            PairingPayload::parse(r#"{"ip":"1.2.3.4","port":8765,"token":""}"#),
            Err(PayloadError::MissingField("token"))
        ));
    }
}
