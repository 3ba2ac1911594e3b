//! `HttpClient` backed by reqwest.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::context::{PropagationContext, PropagationKey};
use crate::dispatch::{ClientResult, HeadRequest, HttpClient, ReadRequest, Verb, WriteRequest};
use crate::path::RequestTarget;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Request or response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl Payload {
    fn default_media_type(&self) -> Option<&'static str> {
        match self {
            Payload::Empty => None,
            Payload::Text(_) => Some("text/plain"),
            Payload::Json(_) => Some("application/json"),
            Payload::Bytes(_) => Some("application/octet-stream"),
        }
    }
}

/// How the response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetType {
    Text,
    #[default]
    Json,
    Bytes,
}

/// A successful response.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Payload,
}

/// Errors returned to the caller as values.
#[derive(Debug, Error)]
pub enum ReqwestClientError {
    /// Client could not be built from configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// Request target could not be resolved against the base URL.
    #[error("Invalid request target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// Request target resolved to a host other than the base URL's.
    #[error("Request target '{target}' resolved off the base host: {url}")]
    OffBase { target: String, url: String },

    /// Network or protocol failure.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String, body: String },

    /// JSON body could not be encoded or decoded.
    #[error("JSON body error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReqwestResult = Result<ClientResponse, ReqwestClientError>;

/// An [`HttpClient`] that sends requests with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    http: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
}

impl ReqwestClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            default_headers: HeaderMap::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ReqwestClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ReqwestClientError::Config(format!("base_url: {}", e)))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_str(name)
                .map_err(|e| ReqwestClientError::Config(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ReqwestClientError::Config(format!("header '{}': {}", name, e)))?;
            default_headers.insert(name, value);
        }
        if let Some(agent) = &config.user_agent {
            let value = HeaderValue::from_str(agent)
                .map_err(|e| ReqwestClientError::Config(format!("user_agent: {}", e)))?;
            default_headers.insert(USER_AGENT, value);
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ReqwestClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            default_headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append the target to the base URL, keeping any base path.
    ///
    /// A target without a leading `/` or `?` is treated as relative to the
    /// base path. The resolved URL must stay on the base host and port.
    pub fn resolve(&self, target: &RequestTarget) -> Result<Url, ReqwestClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let target = target.as_str();
        let separator = if target.starts_with('/') || target.starts_with('?') {
            ""
        } else {
            "/"
        };

        let url = Url::parse(&format!("{}{}{}", base, separator, target)).map_err(|source| {
            ReqwestClientError::InvalidTarget {
                target: target.to_string(),
                source,
            }
        })?;

        if url.host_str() != self.base_url.host_str()
            || url.port_or_known_default() != self.base_url.port_or_known_default()
        {
            return Err(ReqwestClientError::OffBase {
                target: target.to_string(),
                url: url.to_string(),
            });
        }
        Ok(url)
    }

    /// Headers for one call: defaults, then forwarding headers from the
    /// propagated context, then the caller's own headers.
    fn request_headers(&self, ctx: &PropagationContext, headers: HeaderMap) -> HeaderMap {
        let mut merged = self.default_headers.clone();
        let forwarded = [
            (PropagationKey::RemoteAddress, X_FORWARDED_FOR),
            (PropagationKey::OriginHost, X_FORWARDED_HOST),
        ];
        for (key, header) in forwarded {
            let value = ctx
                .get_as::<String>(key)
                .and_then(|v| HeaderValue::from_str(v).ok());
            if let Some(value) = value {
                merged.insert(header, value);
            }
        }
        // Caller headers replace defaults but keep every value they carry.
        for name in headers.keys() {
            merged.remove(name);
        }
        for (name, value) in headers.iter() {
            merged.append(name.clone(), value.clone());
        }
        merged
    }

    async fn send(
        &self,
        verb: Verb,
        ctx: &PropagationContext,
        target: &RequestTarget,
        headers: HeaderMap,
        body: Option<(Payload, Option<String>)>,
        target_type: Option<TargetType>,
    ) -> ReqwestResult {
        let url = self.resolve(target)?;
        let url_str = url.to_string();

        tracing::debug!(
            method = verb.as_method(),
            url = %url_str,
            main_strand = ctx.is_main_strand(),
            propagated = ?ctx.keys(),
            "Sending request"
        );

        let mut request = self
            .http
            .request(method_for(verb), url)
            .headers(self.request_headers(ctx, headers));

        if let Some((payload, media_type)) = body {
            let content_type = media_type.or_else(|| payload.default_media_type().map(String::from));
            if let Some(content_type) = content_type {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = match payload {
                Payload::Empty => request,
                Payload::Text(text) => request.body(text),
                Payload::Json(value) => request.body(serde_json::to_vec(&value)?),
                Payload::Bytes(bytes) => request.body(bytes),
            };
        }

        let response = request
            .send()
            .await
            .map_err(|source| ReqwestClientError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ReqwestClientError::Transport {
                url: url_str.clone(),
                source,
            })?;

        if !status.is_success() {
            tracing::debug!(url = %url_str, status = status.as_u16(), "Non-success status");
            return Err(ReqwestClientError::Status {
                status: status.as_u16(),
                url: url_str,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let body = match target_type {
            _ if bytes.is_empty() => Payload::Empty,
            None => Payload::Empty,
            Some(TargetType::Text) => Payload::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Some(TargetType::Json) => Payload::Json(serde_json::from_slice(&bytes)?),
            Some(TargetType::Bytes) => Payload::Bytes(bytes.to_vec()),
        };

        Ok(ClientResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

fn method_for(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Patch => Method::PATCH,
        Verb::Delete => Method::DELETE,
        Verb::Head => Method::HEAD,
        Verb::Options => Method::OPTIONS,
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    type Headers = HeaderMap;
    type Message = Payload;
    type TargetType = TargetType;
    type MediaType = String;
    type Output = ReqwestResult;

    async fn process_get(
        &self,
        ctx: PropagationContext,
        request: ReadRequest<HeaderMap, TargetType>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self
            .send(Verb::Get, &ctx, &request.path, request.headers, None, Some(request.target_type))
            .await)
    }

    async fn process_post(
        &self,
        ctx: PropagationContext,
        request: WriteRequest<Payload, TargetType, String, HeaderMap>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self.send_write(Verb::Post, ctx, request).await)
    }

    async fn process_put(
        &self,
        ctx: PropagationContext,
        request: WriteRequest<Payload, TargetType, String, HeaderMap>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self.send_write(Verb::Put, ctx, request).await)
    }

    async fn process_patch(
        &self,
        ctx: PropagationContext,
        request: WriteRequest<Payload, TargetType, String, HeaderMap>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self.send_write(Verb::Patch, ctx, request).await)
    }

    async fn process_delete(
        &self,
        ctx: PropagationContext,
        request: WriteRequest<Payload, TargetType, String, HeaderMap>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self.send_write(Verb::Delete, ctx, request).await)
    }

    async fn head(
        &self,
        ctx: PropagationContext,
        request: HeadRequest<HeaderMap>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self
            .send(Verb::Head, &ctx, &request.path, request.headers, None, None)
            .await)
    }

    async fn process_options(
        &self,
        ctx: PropagationContext,
        request: ReadRequest<HeaderMap, TargetType>,
    ) -> ClientResult<ReqwestResult> {
        Ok(self
            .send(Verb::Options, &ctx, &request.path, request.headers, None, Some(request.target_type))
            .await)
    }
}

impl ReqwestClient {
    async fn send_write(
        &self,
        verb: Verb,
        ctx: PropagationContext,
        request: WriteRequest<Payload, TargetType, String, HeaderMap>,
    ) -> ReqwestResult {
        self.send(
            verb,
            &ctx,
            &request.path,
            request.headers,
            Some((request.message, request.media_type)),
            Some(request.target_type),
        )
        .await
    }
}
