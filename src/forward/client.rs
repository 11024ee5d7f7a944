//! Default forwarding mechanism over a pooled HTTP/1.1 client.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Response, Uri, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::forward::{ForwardError, Forwarder, Hooks};
use crate::load_balancer::Backend;

static HOP_BY_HOP: [header::HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards through a `hyper_util` legacy client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
}

impl HttpForwarder {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Use a preconfigured client (pool settings, connector options).
    pub fn with_client(client: Client<HttpConnector, Body>) -> Self {
        Self { client }
    }
}

impl Default for HttpForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        backend: &Backend,
        mut request: Request<Body>,
        hooks: &Hooks,
    ) -> Result<Response<Body>, ForwardError> {
        *request.uri_mut() = upstream_uri(backend.url(), request.uri())?;
        *request.version_mut() = Version::HTTP_11;
        strip_hop_by_hop(request.headers_mut());
        hooks.apply_request(&mut request, backend);

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let mut response = Response::from_parts(parts, Body::new(body));
        strip_hop_by_hop(response.headers_mut());
        hooks.apply_response(&mut response)?;
        Ok(response)
    }
}

/// Point `original` at `target`: target scheme and authority, target path
/// joined with the request path, both query strings kept.
pub fn upstream_uri(target: &Url, original: &Uri) -> Result<Uri, ForwardError> {
    let host = target
        .host_str()
        .ok_or_else(|| ForwardError::InvalidRequest(format!("{} has no host", target)))?;
    let authority = match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let path = join_paths(target.path(), original.path());
    let query = match (target.query(), original.query()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => format!("?{}&{}", a, b),
        (Some(a), _) if !a.is_empty() => format!("?{}", a),
        (_, Some(b)) if !b.is_empty() => format!("?{}", b),
        _ => String::new(),
    };

    format!("{}://{}{}{}", target.scheme(), authority, path, query)
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidRequest(e.to_string()))
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named by Connection are hop-by-hop too
    let named: Vec<header::HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| name.trim().parse().ok())
        .collect();
    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
