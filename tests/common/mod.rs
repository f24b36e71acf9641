#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, Mutex, MutexGuard},
    thread,
};

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// One request as seen by the stub collection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenRequest {
    pub method: Method,
    pub body: Option<Value>,
}

#[derive(Default)]
struct StubData {
    records: Vec<Value>,
    next_id: u64,
    requests: Vec<SeenRequest>,
    failing: bool,
    raw_list: Option<String>,
}

/// In-memory `/racao` collection shared between a test and its stub server.
#[derive(Clone, Default)]
pub struct StubState {
    inner: Arc<Mutex<StubData>>,
}

impl StubState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Value>) -> Self {
        let state = Self::default();
        state.lock().records = records;
        state
    }

    pub fn records(&self) -> Vec<Value> {
        self.lock().records.clone()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.lock().requests.clone()
    }

    /// Every following request answers 500.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Replaces the `GET` payload with `body`, sent verbatim as JSON.
    pub fn set_raw_list(&self, body: &str) {
        self.lock().raw_list = Some(body.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, StubData> {
        self.inner.lock().expect("stub state lock")
    }

    fn begin(
        &self,
        method: Method,
        body: Option<Value>,
    ) -> Result<MutexGuard<'_, StubData>, Response> {
        let mut data = self.lock();
        data.requests.push(SeenRequest { method, body });
        if data.failing {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "database offline" })),
            )
                .into_response());
        }
        Ok(data)
    }
}

pub fn router(state: StubState) -> Router {
    Router::new()
        .route(
            "/racao",
            get(list_records)
                .post(create_record)
                .patch(update_record)
                .delete(delete_record),
        )
        .with_state(state)
}

fn not_found(id: &Value) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("record {id} not found") })),
    )
        .into_response()
}

async fn list_records(State(state): State<StubState>) -> Response {
    let data = match state.begin(Method::GET, None) {
        Ok(data) => data,
        Err(response) => return response,
    };
    if let Some(raw) = &data.raw_list {
        return ([(header::CONTENT_TYPE, "application/json")], raw.clone()).into_response();
    }
    Json(Value::Array(data.records.clone())).into_response()
}

async fn create_record(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut data = match state.begin(Method::POST, Some(body.clone())) {
        Ok(data) => data,
        Err(response) => return response,
    };
    data.next_id += 1;
    let mut record = body;
    record["_id"] = json!(format!("{:024x}", data.next_id));
    data.records.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_record(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut data = match state.begin(Method::PATCH, Some(body.clone())) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let Some(record) = data.records.iter_mut().find(|record| record["_id"] == id) else {
        return not_found(&id);
    };
    for key in ["marca", "quantidade", "valor", "data"] {
        if let Some(value) = body.get(key) {
            record[key] = value.clone();
        }
    }
    Json(record.clone()).into_response()
}

async fn delete_record(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut data = match state.begin(Method::DELETE, Some(body.clone())) {
        Ok(data) => data,
        Err(response) => return response,
    };
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let before = data.records.len();
    data.records.retain(|record| record["_id"] != id);
    if data.records.len() == before {
        return not_found(&id);
    }
    Json(json!({ "deleted": id })).into_response()
}

/// Serves the stub on the current tokio runtime and returns its base URL.
pub async fn serve_stub(state: StubState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// Serves the stub from a dedicated thread, for tests that block.
pub fn spawn_stub_server(state: StubState) -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
            tx.send(listener.local_addr().expect("stub address"))
                .expect("report stub address");
            axum::serve(listener, router(state)).await.expect("stub server");
        });
    });
    format!("http://{}", rx.recv().expect("stub address"))
}

pub fn record_json(id: &str, brand: &str, quantity: f64, price: f64, date: &str) -> Value {
    json!({
        "_id": id,
        "marca": brand,
        "quantidade": quantity,
        "valor": price,
        "data": date,
        "__v": 0
    })
}

/// Three purchases across three months, in server (insertion) order.
pub fn sample_records() -> Vec<Value> {
    vec![
        record_json("a1", "Golden", 10.0, 10.0, "2024-01-01T00:00:00.000Z"),
        record_json("b2", "Premier", 15.0, 25.5, "2024-03-10T00:00:00.000Z"),
        record_json("c3", "Pedigree", 7.5, 42.0, "2024-02-20T00:00:00.000Z"),
    ]
}
