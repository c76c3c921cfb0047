// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes HTTP endpoint, an in-memory cluster and log capture.

use crate::error::{DeployError, Result};
use crate::kubernetes::ClusterApi;
use crate::types::{ResourceDefinition, ResourceKind};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimStatus, Pod, PodCondition, PodStatus, Secret,
};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;
use tracing_subscriber::fmt::MakeWriter;

/// A mock HTTP service that returns predefined responses based on request paths
/// and records every request it receives.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Method and path of every request seen so far, in arrival order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Longest registered prefix wins, e.g. /api/v1/namespaces/foo for /api/v1/namespaces/foo/x
        responses
            .iter()
            .filter(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .max_by_key(|((_, p), _)| p.len())
            .map(|(_, resp)| resp.clone())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path));

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#.to_string(),
                )
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    object_json("v1", "Namespace", name)
}

/// A minimal object of any kind
pub fn object_json(api_version: &str, kind: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// A list response holding one minimal item per name
pub fn list_json(api_version: &str, list_kind: &str, names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| serde_json::json!({ "metadata": { "name": name } }))
        .collect();
    serde_json::json!({
        "apiVersion": api_version,
        "kind": list_kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// A cluster mutation recorded by [`FakeCluster`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    CreateNamespace(String),
    DeleteNamespace(String),
    Create(ResourceKind, String),
    Delete(ResourceKind, String),
    ApplySecret(String),
}

#[derive(Default)]
struct FakeState {
    namespaces: BTreeSet<String>,
    objects: BTreeMap<ResourceKind, Vec<String>>,
    calls: Vec<ClusterCall>,
    failing_creates: BTreeSet<String>,
    failing_deletes: BTreeSet<String>,
    failing_lists: BTreeSet<ResourceKind>,
    /// Pod checks answered "not ready" before the database reports ready; `None` never does
    pods_ready_after: Option<usize>,
    pod_checks: usize,
    claims_pending: bool,
}

/// In-memory cluster recording every mutation in order
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<FakeState>,
}

fn api_failure(message: String, code: u16) -> DeployError {
    DeployError::KubeError(kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: "InternalError".to_string(),
        code,
    }))
}

impl FakeCluster {
    pub fn new() -> Self {
        let cluster = Self::default();
        cluster.state.lock().unwrap().pods_ready_after = Some(0);
        cluster
    }

    pub fn with_namespace(self, namespace: &str) -> Self {
        self.state.lock().unwrap().namespaces.insert(namespace.to_string());
        self
    }

    pub fn with_object(self, kind: ResourceKind, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .objects
            .entry(kind)
            .or_default()
            .push(name.to_string());
        self
    }

    pub fn failing_create(self, name: &str) -> Self {
        self.state.lock().unwrap().failing_creates.insert(name.to_string());
        self
    }

    pub fn failing_delete(self, name: &str) -> Self {
        self.state.lock().unwrap().failing_deletes.insert(name.to_string());
        self
    }

    pub fn failing_list(self, kind: ResourceKind) -> Self {
        self.state.lock().unwrap().failing_lists.insert(kind);
        self
    }

    pub fn pods_ready_after(self, checks: usize) -> Self {
        self.state.lock().unwrap().pods_ready_after = Some(checks);
        self
    }

    pub fn pods_never_ready(self) -> Self {
        self.state.lock().unwrap().pods_ready_after = None;
        self
    }

    pub fn claims_pending(self) -> Self {
        self.state.lock().unwrap().claims_pending = true;
        self
    }

    pub fn calls(&self) -> Vec<ClusterCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn pod_checks(&self) -> usize {
        self.state.lock().unwrap().pod_checks
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().namespaces.contains(namespace))
    }

    async fn create_namespace(&self, namespace: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClusterCall::CreateNamespace(namespace.to_string()));
        state.namespaces.insert(namespace.to_string());
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClusterCall::DeleteNamespace(namespace.to_string()));
        state.namespaces.remove(namespace);
        Ok(())
    }

    async fn create(&self, _namespace: &str, definition: &ResourceDefinition) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(ClusterCall::Create(definition.kind, definition.name.clone()));
        if state.failing_creates.contains(&definition.name) {
            return Err(api_failure(format!("cannot create {}", definition.name), 500));
        }
        let live = state.objects.entry(definition.kind).or_default();
        if live.contains(&definition.name) {
            return Err(api_failure(format!("{} already exists", definition.name), 409));
        }
        live.push(definition.name.clone());
        Ok(())
    }

    async fn list_names(&self, kind: ResourceKind, _namespace: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.failing_lists.contains(&kind) {
            return Err(api_failure(format!("cannot list {}", kind), 500));
        }
        Ok(state.objects.get(&kind).cloned().unwrap_or_default())
    }

    async fn delete(&self, kind: ResourceKind, _namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClusterCall::Delete(kind, name.to_string()));
        if state.failing_deletes.contains(name) {
            return Err(api_failure(format!("cannot delete {}", name), 500));
        }
        if let Some(live) = state.objects.get_mut(&kind) {
            live.retain(|n| n != name);
        }
        Ok(())
    }

    async fn apply_secret(&self, _namespace: &str, secret: &Secret) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = secret.name_any();
        state.calls.push(ClusterCall::ApplySecret(name.clone()));
        let live = state.objects.entry(ResourceKind::Secret).or_default();
        if !live.contains(&name) {
            live.push(name);
        }
        Ok(())
    }

    async fn list_pods(&self, _namespace: &str, _label_selector: &str) -> Result<Vec<Pod>> {
        let mut state = self.state.lock().unwrap();
        state.pod_checks += 1;
        if state.objects.get(&ResourceKind::Deployment).map_or(true, Vec::is_empty) {
            return Ok(Vec::new());
        }
        let ready = state
            .pods_ready_after
            .is_some_and(|after| state.pod_checks > after);
        Ok(vec![Pod {
            metadata: ObjectMeta {
                name: Some("mysql-0".to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                conditions: Some(vec![PodCondition {
                    type_: "Ready".to_string(),
                    status: if ready { "True" } else { "False" }.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }])
    }

    async fn list_claims(&self, _namespace: &str) -> Result<Vec<PersistentVolumeClaim>> {
        let state = self.state.lock().unwrap();
        let phase = if state.claims_pending { "Pending" } else { "Bound" };
        Ok(state
            .objects
            .get(&ResourceKind::PersistentVolumeClaim)
            .into_iter()
            .flatten()
            .map(|name| PersistentVolumeClaim {
                metadata: ObjectMeta {
                    name: Some(name.clone()),
                    ..Default::default()
                },
                status: Some(PersistentVolumeClaimStatus {
                    phase: Some(phase.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect())
    }
}

/// Shared in-memory sink for captured log output
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route log output on the current thread into a buffer until the guard drops
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
