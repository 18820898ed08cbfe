//! Client metadata recorded with views and likes.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// First `X-Forwarded-For` hop, if it is an IP address.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = forwarded_for(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            ip_address,
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> ClientMeta {
        let (mut parts, _) = req.into_parts();
        ClientMeta::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn forwarded_header_wins() {
        let mut req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("User-Agent", "reader/1.0")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

        let meta = extract(req).await;
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent, "reader/1.0");
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 443))));
        let meta = extract(req).await;
        assert_eq!(meta.ip_address.as_deref(), Some("192.0.2.1"));
        assert_eq!(meta.user_agent, "");
    }

    #[tokio::test]
    async fn garbage_forwarded_hop_is_ignored() {
        let mut req = Request::builder()
            .header("X-Forwarded-For", format!("{}, 10.0.0.1", "x".repeat(60)))
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 443))));
        let meta = extract(req).await;
        assert_eq!(meta.ip_address.as_deref(), Some("192.0.2.1"));
    }

    #[tokio::test]
    async fn forwarded_ipv6_is_accepted() {
        let req = Request::builder()
            .header("X-Forwarded-For", " 2001:db8::1 ")
            .body(())
            .unwrap();
        let meta = extract(req).await;
        assert_eq!(meta.ip_address.as_deref(), Some("2001:db8::1"));
    }

    #[tokio::test]
    async fn no_address_available() {
        let meta = extract(Request::builder().body(()).unwrap()).await;
        assert_eq!(meta, ClientMeta::default());
    }
}
