// JMAP client
// Builds invocations against the session's primary accounts, sends a batch
// of them in a single HTTP exchange and hands back one result per requested
// invocation.

use crate::error::ClientError;
use crate::methods::{method_name, Kind, Method};
use crate::session::{well_known_url, Session};
use bytes::Bytes;
use jmap_batch_core::{
    Capability, Invocation, MethodResponse, ParamValue, Params, RequestAssembler, ResponseDecoder,
};
use jmap_batch_transport::{HttpMethod, HttpTransport, ReqwestTransport};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the JMAP server; the session is read from its well-known path
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Cap on method calls per request, on top of the server's own limit
    pub max_calls_in_request: Option<usize>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 30000,
            max_calls_in_request: None,
        }
    }
}

/// A serialized batch, ready for the transport.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: Bytes,
    decoder: ResponseDecoder,
}

impl PreparedRequest {
    /// One result payload per requested invocation, in request order.
    pub fn parse_results(&self, body: &[u8]) -> Result<Vec<Value>, ClientError> {
        Ok(self.decoder.decode(body)?)
    }

    pub fn parse_responses(&self, body: &[u8]) -> Result<Vec<MethodResponse>, ClientError> {
        Ok(self.decoder.decode_responses(body)?)
    }
}

/// Main client struct for JMAP batch requests
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    config: ClientConfig,
    session: Session,
    api_url: String,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Fetch the session over HTTP and build a client from it.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(Duration::from_millis(config.timeout_ms))?;
        Self::connect_with(config, transport).await
    }
}

impl<T: HttpTransport> Client<T> {
    /// Fetch the session through `transport` and build a client from it.
    pub async fn connect_with(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        let url = well_known_url(&config.base_url)?;
        let body = transport.send(&url, HttpMethod::Get, Bytes::new()).await?;
        let session = Session::from_slice(&body)?;
        info!(
            "Connected to {} as {}",
            config.base_url,
            session.username.as_deref().unwrap_or("<unknown>")
        );
        Self::from_session(config, session, transport)
    }

    pub fn from_session(
        config: ClientConfig,
        session: Session,
        transport: T,
    ) -> Result<Self, ClientError> {
        let api_url = session.resolve_api_url(&config.base_url)?;
        Ok(Self {
            config,
            session,
            api_url,
            transport,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Builder for methods on objects of `kind`.
    pub fn kind(&self, kind: Kind) -> KindCalls<'_, T> {
        KindCalls { client: self, kind }
    }

    pub fn mailbox(&self) -> KindCalls<'_, T> {
        self.kind(Kind::Mailbox)
    }

    pub fn email(&self) -> KindCalls<'_, T> {
        self.kind(Kind::Email)
    }

    pub fn thread(&self) -> KindCalls<'_, T> {
        self.kind(Kind::Thread)
    }

    /// Invocation of `kind`/`method` on the kind's primary account.
    ///
    /// `accountId` is filled in from the session unless `params` already
    /// holds one.
    pub fn invocation(
        &self,
        kind: Kind,
        method: Method,
        mut params: Params,
    ) -> Result<Invocation, ClientError> {
        let capability = kind.capability();
        if !params.contains_key("accountId") {
            let account = self
                .session
                .primary_account(&capability)
                .ok_or_else(|| ClientError::MissingAccount(capability.clone()))?;
            params.insert(
                "accountId".to_string(),
                ParamValue::from(account.to_string()),
            );
        }
        Ok(Invocation::with_capability(
            method_name(kind, method),
            capability,
            params,
        ))
    }

    /// Assembler honoring both the configured and the server's call limit.
    pub fn assembler(&self) -> RequestAssembler {
        let assembler = RequestAssembler::new(vec![Capability::CORE]);
        let limit = match (
            self.config.max_calls_in_request,
            self.session.max_calls_in_request(),
        ) {
            (Some(configured), Some(server)) => Some(configured.min(server)),
            (configured, server) => configured.or(server),
        };
        match limit {
            Some(limit) => assembler.with_max_calls(limit),
            None => assembler,
        }
    }

    /// Build the request for `requested` without sending it.
    pub fn prepare(&self, requested: &[Invocation]) -> Result<PreparedRequest, ClientError> {
        let assembled = self.assembler().assemble(requested)?;
        let body = assembled.request.to_bytes().map_err(jmap_batch_core::BatchError::from)?;
        debug!(
            "Prepared {} method calls for {}",
            assembled.request.method_calls.len(),
            self.api_url
        );
        Ok(PreparedRequest {
            url: self.api_url.clone(),
            method: HttpMethod::Post,
            body,
            decoder: assembled.decoder,
        })
    }

    /// Send a prepared request and decode its response.
    pub async fn send(&self, request: &PreparedRequest) -> Result<Vec<Value>, ClientError> {
        let body = self.exchange(request).await?;
        request.parse_results(&body)
    }

    /// Send `requested` as one batch; one result per entry, in order.
    pub async fn execute(&self, requested: &[Invocation]) -> Result<Vec<Value>, ClientError> {
        let request = self.prepare(requested)?;
        self.send(&request).await
    }

    /// Like [`Client::execute`], keeping each response's method name so
    /// per-call errors can be told apart from results.
    pub async fn execute_responses(
        &self,
        requested: &[Invocation],
    ) -> Result<Vec<MethodResponse>, ClientError> {
        let request = self.prepare(requested)?;
        let body = self.exchange(&request).await?;
        request.parse_responses(&body)
    }

    async fn exchange(&self, request: &PreparedRequest) -> Result<Bytes, ClientError> {
        Ok(self
            .transport
            .send(&request.url, request.method, request.body.clone())
            .await?)
    }
}

/// Methods on one object kind, e.g. `client.email().query(..)`.
#[derive(Debug)]
pub struct KindCalls<'a, T> {
    client: &'a Client<T>,
    kind: Kind,
}

impl<T: HttpTransport> KindCalls<'_, T> {
    pub fn call(&self, method: Method, params: Params) -> Result<Invocation, ClientError> {
        self.client.invocation(self.kind, method, params)
    }

    pub fn get(&self, params: Params) -> Result<Invocation, ClientError> {
        self.call(Method::Get, params)
    }

    pub fn set(&self, params: Params) -> Result<Invocation, ClientError> {
        self.call(Method::Set, params)
    }

    pub fn query(&self, params: Params) -> Result<Invocation, ClientError> {
        self.call(Method::Query, params)
    }

    pub fn changes(&self, params: Params) -> Result<Invocation, ClientError> {
        self.call(Method::Changes, params)
    }

    pub fn query_changes(&self, params: Params) -> Result<Invocation, ClientError> {
        self.call(Method::QueryChanges, params)
    }
}
