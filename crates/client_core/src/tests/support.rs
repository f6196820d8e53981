//! In-process fake backend and recording collaborators shared by the unit tests.

use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::{
    controller::{ControllerContext, DocumentView, UserPrompts},
    flow::EditForm,
    kind::RecordKind,
    render::{Fragment, RenderOptions},
    store::HttpStore,
};

#[derive(Default)]
struct BackendInner {
    collections: HashMap<String, Vec<Value>>,
    calls: Vec<String>,
    content_types: Vec<String>,
    bodies: Vec<Value>,
    fail_list_with: Option<StatusCode>,
    fail_mutations_with: Option<StatusCode>,
}

#[derive(Clone, Default)]
pub(crate) struct BackendState {
    inner: Arc<Mutex<BackendInner>>,
}

impl BackendState {
    fn lock(&self) -> MutexGuard<'_, BackendInner> {
        self.inner.lock().expect("backend state poisoned")
    }
}

pub(crate) struct FakeBackend {
    pub api_base: String,
    state: BackendState,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.state.lock().content_types.clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.lock().bodies.clone()
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state
            .lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Inserts a record as the server would return it; newest first.
    pub fn seed(&self, collection: &str, record: Value) {
        self.state
            .lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(0, record);
    }

    pub fn fail_list_with(&self, status: Option<StatusCode>) {
        self.state.lock().fail_list_with = status;
    }

    pub fn fail_mutations_with(&self, status: Option<StatusCode>) {
        self.state.lock().fail_mutations_with = status;
    }
}

pub(crate) async fn spawn_backend() -> FakeBackend {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let state = BackendState::default();
    {
        let mut inner = state.lock();
        inner.collections.insert("todos".into(), Vec::new());
        inner.collections.insert("blogs".into(), Vec::new());
    }

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/:collection", get(list).post(create))
        .route(
            "/api/:collection/:id",
            get(fetch_one).put(update).delete(remove),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    FakeBackend {
        api_base: format!("http://{addr}/api"),
        state,
    }
}

/// An address nothing listens on.
pub(crate) async fn unreachable_api_base() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

pub(crate) fn sample_record(collection: &str, id: &str, title: &str) -> Value {
    let now = Utc::now().to_rfc3339();
    let mut record = json!({
        "id": id,
        "title": title,
        "content": "",
        "created_at": now,
        "updated_at": now,
    });
    if collection == "todos" {
        record["completed"] = json!(false);
    } else {
        record["tags"] = json!("");
    }
    record
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "testbox-backend" }))
}

async fn list(State(state): State<BackendState>, Path(collection): Path<String>) -> Response {
    let mut inner = state.lock();
    inner.calls.push(format!("GET /{collection}"));
    if let Some(status) = inner.fail_list_with {
        return (status, Json(json!({ "error": "boom" }))).into_response();
    }
    match inner.collections.get(&collection) {
        Some(records) => Json(records.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn fetch_one(
    State(state): State<BackendState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let mut inner = state.lock();
    inner.calls.push(format!("GET /{collection}/{id}"));
    let found = inner
        .collections
        .get(&collection)
        .and_then(|records| records.iter().find(|r| r["id"] == id.as_str()))
        .cloned();
    match found {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

async fn create(
    State(state): State<BackendState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock();
    inner.calls.push(format!("POST /{collection}"));
    record_request(&mut inner, &headers, &body);
    if let Some(status) = inner.fail_mutations_with {
        return status.into_response();
    }

    let Some(records) = inner.collections.get_mut(&collection) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let now = Utc::now().to_rfc3339();
    let mut record = body;
    record["id"] = json!(uuid::Uuid::new_v4().to_string());
    record["created_at"] = json!(now);
    record["updated_at"] = json!(now);
    if collection == "todos" {
        record["completed"] = json!(false);
    }
    records.insert(0, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update(
    State(state): State<BackendState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock();
    inner.calls.push(format!("PUT /{collection}/{id}"));
    record_request(&mut inner, &headers, &body);
    if let Some(status) = inner.fail_mutations_with {
        return status.into_response();
    }

    let Some(record) = inner
        .collections
        .get_mut(&collection)
        .and_then(|records| records.iter_mut().find(|r| r["id"] == id.as_str()))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    record["updated_at"] = json!((Utc::now() + Duration::seconds(5)).to_rfc3339());
    Json(record.clone()).into_response()
}

async fn remove(
    State(state): State<BackendState>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    let mut inner = state.lock();
    inner.calls.push(format!("DELETE /{collection}/{id}"));
    if let Some(status) = inner.fail_mutations_with {
        return status.into_response();
    }

    let Some(records) = inner.collections.get_mut(&collection) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let before = records.len();
    records.retain(|r| r["id"] != id.as_str());
    if records.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn record_request(inner: &mut BackendInner, headers: &HeaderMap, body: &Value) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    inner.content_types.push(content_type);
    inner.bodies.push(body.clone());
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewEvent<F> {
    Replaced(Fragment),
    FormReset,
    EditShown(EditForm<F>),
    EditHidden,
}

pub(crate) struct RecordingView<K: RecordKind> {
    events: Mutex<Vec<ViewEvent<K::Changes>>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RecordKind> RecordingView<K> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            _kind: PhantomData,
        })
    }

    pub fn events(&self) -> Vec<ViewEvent<K::Changes>> {
        self.events.lock().expect("view poisoned").clone()
    }

    pub fn last_fragment(&self) -> Option<Fragment> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Replaced(fragment) => Some(fragment),
            _ => None,
        })
    }

    pub fn count(&self, wanted: fn(&ViewEvent<K::Changes>) -> bool) -> usize {
        self.events().iter().filter(|e| wanted(e)).count()
    }

    fn push(&self, event: ViewEvent<K::Changes>) {
        self.events.lock().expect("view poisoned").push(event);
    }
}

impl<K: RecordKind> DocumentView<K> for RecordingView<K> {
    fn replace_items(&self, fragment: &Fragment) {
        self.push(ViewEvent::Replaced(fragment.clone()));
    }

    fn reset_add_form(&self) {
        self.push(ViewEvent::FormReset);
    }

    fn show_edit_surface(&self, form: &EditForm<K::Changes>) {
        self.push(ViewEvent::EditShown(form.clone()));
    }

    fn hide_edit_surface(&self) {
        self.push(ViewEvent::EditHidden);
    }
}

pub(crate) struct ScriptedPrompts {
    confirm_answer: bool,
    pub alerts: Mutex<Vec<String>>,
    pub confirmations: Mutex<Vec<String>>,
}

impl ScriptedPrompts {
    pub fn answering(confirm_answer: bool) -> Arc<Self> {
        Arc::new(Self {
            confirm_answer,
            alerts: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().expect("prompts poisoned").clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().expect("prompts poisoned").clone()
    }
}

impl UserPrompts for ScriptedPrompts {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .expect("prompts poisoned")
            .push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations
            .lock()
            .expect("prompts poisoned")
            .push(message.to_string());
        self.confirm_answer
    }
}

pub(crate) fn http_context<K: RecordKind>(
    api_base: &str,
    view: Arc<RecordingView<K>>,
    prompts: Arc<ScriptedPrompts>,
) -> ControllerContext<K> {
    ControllerContext {
        store: Arc::new(HttpStore::<K>::new(api_base).expect("api base")),
        view,
        prompts,
        render: RenderOptions::default(),
    }
}
