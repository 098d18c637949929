// End-to-end batch exchanges: session bootstrap, one request per batch,
// results mapped back onto the requested invocations.

use async_trait::async_trait;
use bytes::Bytes;
use jmap_batch_client::logging::init_test_logging;
use jmap_batch_client::{params, Client, ClientConfig, ClientError, Kind, Method};
use jmap_batch_core::{BatchError, ConstructionError, ProtocolMismatchError};
use jmap_batch_transport::{HttpMethod, HttpTransport, TransportError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const SESSION: &str = r#"{
    "capabilities": {
        "urn:ietf:params:jmap:core": {"maxCallsInRequest": 4},
        "urn:ietf:params:jmap:mail": {}
    },
    "primaryAccounts": {
        "urn:ietf:params:jmap:mail": "u1",
        "urn:ietf:params:jmap:submission": "u1"
    },
    "username": "jane@example.com",
    "apiUrl": "/jmap/api",
    "state": "s0"
}"#;

type Responder = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Serves the session document and answers POSTs with `respond`.
struct ScriptedTransport {
    respond: Responder,
    sent: Mutex<Vec<(String, HttpMethod, Value)>>,
}

impl ScriptedTransport {
    fn new(respond: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn posts(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, method, _)| *method == HttpMethod::Post)
            .map(|(_, _, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Bytes,
    ) -> Result<Bytes, TransportError> {
        match method {
            HttpMethod::Get => {
                assert_eq!(url, "https://mail.example.org/.well-known/jmap");
                self.sent
                    .lock()
                    .unwrap()
                    .push((url.to_string(), method, Value::Null));
                Ok(Bytes::from_static(SESSION.as_bytes()))
            }
            HttpMethod::Post => {
                let request: Value = serde_json::from_slice(&body).unwrap();
                let response = (self.respond)(&request);
                self.sent
                    .lock()
                    .unwrap()
                    .push((url.to_string(), method, request));
                Ok(Bytes::from(response.to_string()))
            }
        }
    }
}

/// Answer every method call with `{"echo": <id>}`, last call first.
fn echo(request: &Value) -> Value {
    let responses: Vec<Value> = request["methodCalls"]
        .as_array()
        .unwrap()
        .iter()
        .rev()
        .map(|call| json!([call[0], {"echo": call[2]}, call[2]]))
        .collect();
    json!({ "methodResponses": responses, "sessionState": "s0" })
}

async fn connect(transport: Arc<ScriptedTransport>) -> Client<Arc<ScriptedTransport>> {
    init_test_logging();
    Client::connect_with(ClientConfig::new("https://mail.example.org"), transport)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_dependent_calls_share_one_request() {
    let transport = ScriptedTransport::new(echo);
    let client = connect(transport.clone()).await;
    assert_eq!(client.api_url(), "https://mail.example.org/jmap/api");

    let inbox = client
        .mailbox()
        .query(params! { "filter" => json!({"role": "inbox"}) })
        .unwrap();
    let emails = client
        .email()
        .query(params! {
            "filter" => json!({"inMailbox": "placeholder"}),
            "limit" => 10,
        })
        .unwrap();
    let threads = client
        .thread()
        .get(params! { "ids" => &emails / "ids" })
        .unwrap();

    let results = client.execute(&[inbox.clone(), threads.clone()]).await.unwrap();

    assert_eq!(
        results,
        vec![
            json!({"echo": inbox.id().as_str()}),
            json!({"echo": threads.id().as_str()}),
        ]
    );

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    let calls = posts[0]["methodCalls"].as_array().unwrap();
    let order: Vec<&str> = calls.iter().map(|c| c[2].as_str().unwrap()).collect();
    assert_eq!(
        order,
        vec![emails.id().as_str(), inbox.id().as_str(), threads.id().as_str()]
    );
    assert_eq!(
        calls[2][1]["#ids"],
        json!({"resultOf": emails.id().as_str(), "name": "Email/query", "path": "/ids"})
    );
    assert_eq!(calls[2][1]["accountId"], json!("u1"));
}

#[tokio::test]
async fn test_result_of_one_batch_feeds_the_next() {
    let transport = ScriptedTransport::new(|request: &Value| {
        let responses: Vec<Value> = request["methodCalls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|call| match call[0].as_str() {
                Some("Mailbox/query") => json!([call[0], {"ids": ["mb-inbox"]}, call[2]]),
                _ => json!([call[0], {"filter": call[1]["filter"]}, call[2]]),
            })
            .collect();
        json!({ "methodResponses": responses })
    });
    let client = connect(transport.clone()).await;

    let inbox = client
        .mailbox()
        .query(params! { "filter" => json!({"role": "inbox"}), "limit" => 1 })
        .unwrap();
    let found = client.execute(&[inbox]).await.unwrap();
    let inbox_id = found[0]["ids"][0].clone();
    assert_eq!(inbox_id, json!("mb-inbox"));

    let latest = client
        .email()
        .query(params! { "filter" => json!({"inMailbox": inbox_id}) })
        .unwrap();
    let get = client
        .email()
        .get(params! { "ids" => &latest / "ids" })
        .unwrap();
    client.execute(&[get]).await.unwrap();

    let posts = transport.posts();
    assert_eq!(posts.len(), 2);
    let calls = posts[1]["methodCalls"].as_array().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][1]["filter"], json!({"inMailbox": "mb-inbox"}));
    assert_eq!(calls[1][1]["#ids"]["resultOf"], json!(latest.id().as_str()));
}

#[tokio::test]
async fn test_missing_response_is_reported() {
    let transport = ScriptedTransport::new(|request: &Value| {
        let first = &request["methodCalls"][0];
        json!({ "methodResponses": [[first[0], {}, first[2]]] })
    });
    let client = connect(transport).await;

    let a = client.mailbox().get(params! {}).unwrap();
    let b = client.kind(Kind::Identity).call(Method::Get, params! {}).unwrap();

    let err = client.execute(&[a, b.clone()]).await.unwrap_err();
    match err {
        ClientError::Batch(BatchError::ProtocolMismatch(ProtocolMismatchError::MissingResult {
            id,
            ..
        })) => assert_eq!(&id, b.id()),
        other => panic!("expected a missing result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_call_limit_is_enforced_before_sending() {
    let transport = ScriptedTransport::new(echo);
    let client = connect(transport.clone()).await;

    let calls: Vec<_> = (0..5)
        .map(|_| client.mailbox().get(params! {}).unwrap())
        .collect();
    let err = client.execute(&calls).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Batch(BatchError::Construction(ConstructionError::TooManyCalls {
            count: 5,
            limit: 4
        }))
    ));
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_method_errors_are_returned_as_results() {
    let transport = ScriptedTransport::new(|request: &Value| {
        let call = &request["methodCalls"][0];
        json!({ "methodResponses": [["error", {"type": "invalidArguments"}, call[2]]] })
    });
    let client = connect(transport).await;

    let set = client.email().set(params! { "destroy" => json!(["m1"]) }).unwrap();
    let responses = client.execute_responses(&[set]).await.unwrap();

    assert_eq!(responses.len(), 1);
    assert_eq!(
        responses[0].error().map(|e| e.kind),
        Some("invalidArguments".to_string())
    );
}

#[tokio::test]
async fn test_against_http_server() {
    init_test_logging();
    let mut server = mockito::Server::new_async().await;
    let session = server
        .mock("GET", "/.well-known/jmap")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SESSION)
        .create_async()
        .await;
    let api = server
        .mock("POST", "/jmap/api")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(|request| {
            let body: Value = serde_json::from_slice(request.body().unwrap()).unwrap();
            echo(&body).to_string().into_bytes()
        })
        .expect(1)
        .create_async()
        .await;

    let client = Client::connect(ClientConfig::new(server.url())).await.unwrap();
    let query = client.email().query(params! {}).unwrap();
    let get = client
        .email()
        .get(params! { "ids" => &query / "ids", "properties" => json!(["subject"]) })
        .unwrap();

    let results = client.execute(&[get.clone()]).await.unwrap();
    assert_eq!(results, vec![json!({"echo": get.id().as_str()})]);

    session.assert_async().await;
    api.assert_async().await;
}

#[tokio::test]
async fn test_http_failure_is_a_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _session = server
        .mock("GET", "/.well-known/jmap")
        .with_status(200)
        .with_body(SESSION)
        .create_async()
        .await;
    let _api = server
        .mock("POST", "/jmap/api")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = Client::connect(ClientConfig::new(server.url())).await.unwrap();
    let get = client.mailbox().get(params! {}).unwrap();

    let err = client.execute(&[get]).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Status { status: 500, .. })
    ));
}
