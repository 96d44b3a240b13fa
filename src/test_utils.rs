// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: pod builders, in-memory collaborators, a mock Kubernetes
//! API server and a loopback HTTP server for the chat client.

use crate::error::{InformerError, Result as InformerResult};
use crate::notify::{Alert, LogSource, Notifier};
use crate::types::ResourceKey;
use crate::watch::PodCache;
use async_trait::async_trait;
use http::{Request, Response, StatusCode};
use k8s_openapi::api::core::v1::{
    ContainerState, ContainerStateRunning, ContainerStateTerminated, ContainerStateWaiting,
    ContainerStatus, Pod, PodStatus,
};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tower::Service;
use url::Url;

/// Build a pod in the `default` namespace
pub fn pod_with(
    name: &str,
    annotations: BTreeMap<String, String>,
    statuses: Vec<ContainerStatus>,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        status: Some(PodStatus {
            container_statuses: Some(statuses),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Container status that is waiting with the given reason
pub fn container_status(name: &str, ready: bool, waiting_reason: Option<&str>) -> ContainerStatus {
    ContainerStatus {
        name: name.to_string(),
        ready,
        state: Some(ContainerState {
            waiting: Some(ContainerStateWaiting {
                reason: waiting_reason.map(str::to_string),
                message: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn running_container(name: &str) -> ContainerStatus {
    ContainerStatus {
        name: name.to_string(),
        ready: true,
        state: Some(ContainerState {
            running: Some(ContainerStateRunning::default()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn terminated_state(reason: &str) -> ContainerState {
    ContainerState {
        terminated: Some(ContainerStateTerminated {
            exit_code: 1,
            reason: Some(reason.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pod cache backed by a map, with injectable lookup failures
#[derive(Default)]
pub struct FakeCache {
    pods: Mutex<HashMap<ResourceKey, Arc<Pod>>>,
    failures: Mutex<usize>,
}

impl FakeCache {
    pub fn insert(&self, pod: Pod) {
        self.pods
            .lock()
            .unwrap()
            .insert(ResourceKey::from_pod(&pod), Arc::new(pod));
    }

    pub fn remove(&self, key: &ResourceKey) {
        self.pods.lock().unwrap().remove(key);
    }

    /// Fail the next `n` lookups
    pub fn fail_next(&self, n: usize) {
        *self.failures.lock().unwrap() = n;
    }
}

impl PodCache for FakeCache {
    fn get_by_key(&self, key: &ResourceKey) -> InformerResult<Option<Arc<Pod>>> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(InformerError::CacheSyncError("injected lookup failure".to_string()));
        }
        Ok(self.pods.lock().unwrap().get(key).cloned())
    }
}

/// Notifier that records delivered alerts and can fail on demand
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Alert>>,
    attempts: Mutex<usize>,
    failures: Mutex<usize>,
}

impl RecordingNotifier {
    /// Fail the next `n` deliveries
    pub fn fail_next(&self, n: usize) {
        *self.failures.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_alert(&self, alert: &Alert) -> InformerResult<()> {
        *self.attempts.lock().unwrap() += 1;
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(InformerError::MattermostError {
                    status: 503,
                    body: "service unavailable".to_string(),
                });
            }
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Log source returning fixed output, or failing when `None`
pub struct StaticLogs(pub Option<&'static str>);

#[async_trait]
impl LogSource for StaticLogs {
    async fn container_logs(&self, _key: &ResourceKey, _container: &str) -> InformerResult<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| InformerError::ConfigError("logs unavailable".to_string()))
    }
}

/// A request seen by one of the mock servers
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Clone)]
struct CannedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

type Routes = HashMap<(String, String), CannedResponse>;

fn status_body(status: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": status
    })
    .to_string()
}

/// Kubernetes API server stand-in, served in process as the client's transport
#[derive(Clone, Default)]
pub struct MockApiServer {
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GETs of `path` (query ignored) with a plain body
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().insert(
            ("GET".to_string(), path.to_string()),
            CannedResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Answer GETs of `path` with a `NotFound` status object
    pub fn on_get_missing(self, path: &str, resource: &str, name: &str) -> Self {
        let body = status_body(404, "NotFound", &format!("{resource} \"{name}\" not found"));
        self.on_get(path, 404, &body)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }
}

impl Service<Request<Body>> for MockApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let recorded = RecordedRequest {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            headers: req
                .headers()
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: String::new(),
        };
        let canned = self
            .routes
            .lock()
            .unwrap()
            .get(&(recorded.method.clone(), recorded.path.clone()))
            .cloned();
        let path = recorded.path.clone();
        self.requests.lock().unwrap().push(recorded);

        Box::pin(async move {
            let canned = canned.unwrap_or_else(|| CannedResponse {
                status: 404,
                headers: Vec::new(),
                body: status_body(404, "NotFound", &format!("no route for {path}")),
            });
            Response::builder()
                .status(canned.status)
                .header("content-type", "application/json")
                .body(Body::from(canned.body.into_bytes()))
                .map_err(tower::BoxError::from)
        })
    }
}

/// Plain HTTP/1.1 server on a loopback port for clients that dial out themselves
#[derive(Default)]
pub struct MockHttpServer {
    routes: Routes,
}

pub struct RunningMockHttpServer {
    pub url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockHttpServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        method: &str,
        path: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Self {
        self.routes.insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.to_string(),
            },
        );
        self
    }

    pub async fn start(self) -> RunningMockHttpServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(self.routes);
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, &routes, &recorded).await;
                });
            }
        });

        RunningMockHttpServer {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            requests,
            task,
        }
    }
}

impl RunningMockHttpServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests to `path`, in arrival order
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for RunningMockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read one request, answer it and close the connection
async fn serve_connection(
    mut stream: TcpStream,
    routes: &Routes,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = head_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (body_start + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

    let canned = routes
        .get(&(method.clone(), path.clone()))
        .cloned()
        .unwrap_or_else(|| CannedResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"message":"not found"}"#.to_string(),
        });
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        query,
        headers,
        body,
    });

    let reason = StatusCode::from_u16(canned.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let mut response = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
        canned.status,
        reason,
        canned.body.len()
    );
    for (name, value) in &canned.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&canned.body);

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
