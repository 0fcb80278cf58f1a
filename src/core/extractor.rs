use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::shared::constants::UNKNOWN_CLIENT;

/// Caller identity used for rate limiting and forwarded to the CAPTCHA provider.
///
/// Taken from the first `X-Forwarded-For` entry, then the socket address.
/// Neither is authenticated, so the value is spoofable behind an untrusted proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

impl ClientAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address to hand to third parties, `None` when it could not be derived.
    pub fn remote_ip(&self) -> Option<&str> {
        if self.0 == UNKNOWN_CLIENT {
            None
        } else {
            Some(&self.0)
        }
    }

    pub fn from_parts(headers: &HeaderMap, socket: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match (forwarded, socket) {
            (Some(ip), _) => Self(ip.to_string()),
            (None, Some(addr)) => Self(addr.ip().to_string()),
            (None, None) => Self(UNKNOWN_CLIENT.to_string()),
        }
    }
}

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::from_parts(&parts.headers, socket))
    }
}
