//! Mock dashboard API server for integration tests
//!
//! Serves the same endpoints and payload shapes as the real backend:
//! - GET    /health
//! - GET    /accounts/
//! - GET    /accounts/{id}/balance-history?days=N
//! - PATCH  /accounts/{id}/name
//! - GET    /transactions/?skip&limit&month&year&transaction_type
//! - POST   /transactions/, PUT/DELETE /transactions/{id}
//! - GET    /export
//!
//! Every request line is recorded so tests can count round trips.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Value>,
    transactions: Vec<Value>,
    histories: HashMap<i64, Value>,
    next_id: i64,
    requests: Vec<String>,
    /// "METHOD /path" -> forced status code
    failures: HashMap<String, u16>,
    /// path -> raw body served verbatim
    raw_bodies: HashMap<String, String>,
}

pub struct MockDashboardServer {
    port: u16,
    state: Arc<Mutex<State>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockDashboardServer {
    /// Start on a random port with three accounts and a handful of transactions
    pub fn start() -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(seed_state()));
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let state_clone = state.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            state,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of recorded requests whose "METHOD /path?query" starts with `prefix`
    pub fn request_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Answer `method path` (query ignored) with `status` from now on
    pub fn fail(&self, method: &str, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(format!("{} {}", method, path), status);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Serve `body` verbatim (status 200) for GET `path`
    pub fn serve_raw(&self, path: &str, body: &str) {
        self.state
            .lock()
            .unwrap()
            .raw_bodies
            .insert(path.to_string(), body.to_string());
    }

    pub fn add_transaction(&self, tx: Value) {
        self.state.lock().unwrap().transactions.push(tx);
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockDashboardServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn seed_state() -> State {
    let accounts = vec![
        json!({"id": 1, "name": "Conta Corrente", "balance": 3849.5}),
        json!({"id": 2, "name": "Conta Poupança", "balance": 1000.0}),
        json!({"id": 3, "name": "Carteira", "balance": 0.0}),
    ];
    let transactions = vec![
        json!({"id": 1, "date": "2024-03-15T09:00:00", "description": "Salary",
               "transaction_type": "entrada", "category": "Salary", "amount": 5000.0, "account_id": 1}),
        json!({"id": 2, "date": "2024-03-15T12:30:00", "description": "Groceries",
               "transaction_type": "saida", "category": "Food", "amount": 150.5, "account_id": 1}),
        json!({"id": 3, "date": "2024-03-14T08:00:00", "description": "Broker",
               "transaction_type": "saida", "category": "Invest", "amount": 1000.0, "account_id": 1}),
    ];
    let mut histories = HashMap::new();
    histories.insert(
        1,
        json!([{"date": "2024-03-10", "balance": 0.0},
               {"date": "2024-03-14", "balance": -1000.0},
               {"date": "2024-03-15", "balance": 4000.0},
               {"date": "2024-03-15", "balance": 3849.5}]),
    );
    histories.insert(2, json!([{"date": "2024-03-12", "balance": 1000.0}]));

    State {
        accounts,
        transactions,
        histories,
        next_id: 4,
        ..Default::default()
    }
}

/// Read one HTTP/1.1 request: headers, then Content-Length bytes of body
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((method, target, body))
}

fn handle_connection(mut stream: TcpStream, state: &Arc<Mutex<State>>) {
    let _ = stream.set_nonblocking(false);
    let Some((method, target, body)) = read_request(&mut stream) else {
        return;
    };

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target.clone(), String::new()),
    };
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    let mut state = state.lock().unwrap();
    state.requests.push(format!("{} {}", method, target));

    if let Some(status) = state.failures.get(&format!("{} {}", method, path)).copied() {
        send_response(&mut stream, status, r#"{"detail": "forced failure"}"#);
        return;
    }
    if method == "GET" {
        if let Some(raw) = state.raw_bodies.get(&path).cloned() {
            send_response(&mut stream, 200, &raw);
            return;
        }
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let (status, payload) = match (method.as_str(), segments.as_slice()) {
        ("GET", ["health"]) => (
            200,
            json!({"status": "healthy", "service": "financial-dashboard-api"}),
        ),
        ("GET", ["accounts"]) => (200, Value::Array(state.accounts.clone())),
        ("GET", ["accounts", id, "balance-history"]) => match id.parse::<i64>() {
            Ok(id) if state.accounts.iter().any(|a| a["id"] == id) => (
                200,
                state.histories.get(&id).cloned().unwrap_or_else(|| json!([])),
            ),
            _ => (404, json!({"detail": "Account not found"})),
        },
        ("PATCH", ["accounts", id, "name"]) => rename_account(&mut state, id, &body),
        ("GET", ["transactions"]) => (200, list_transactions(&state, &params)),
        ("POST", ["transactions"]) => create_transaction(&mut state, &body),
        ("PUT", ["transactions", id]) => update_transaction(&mut state, id, &body),
        ("DELETE", ["transactions", id]) => delete_transaction(&mut state, id),
        ("GET", ["export"]) => (
            200,
            json!({"accounts": state.accounts, "transactions": state.transactions}),
        ),
        _ => (404, json!({"detail": "Not Found"})),
    };

    send_response(&mut stream, status, &payload.to_string());
}

fn list_transactions(state: &State, params: &HashMap<String, String>) -> Value {
    let skip: usize = params.get("skip").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(100);

    let filtered: Vec<Value> = state
        .transactions
        .iter()
        .filter(|tx| {
            params
                .get("transaction_type")
                .map_or(true, |t| tx["transaction_type"] == t.as_str())
        })
        .filter(|tx| {
            let date = tx["date"].as_str().unwrap_or("");
            let year_ok = params.get("year").map_or(true, |y| date.starts_with(y.as_str()));
            let month_ok = params.get("month").map_or(true, |m| {
                m.parse::<u32>()
                    .map(|m| date.get(4..8) == Some(format!("-{:02}-", m).as_str()))
                    .unwrap_or(false)
            });
            year_ok && month_ok
        })
        .skip(skip)
        .take(limit)
        .cloned()
        .collect();
    Value::Array(filtered)
}

fn create_transaction(state: &mut State, body: &str) -> (u16, Value) {
    let Ok(mut tx) = serde_json::from_str::<Value>(body) else {
        return (422, json!({"detail": "invalid body"}));
    };
    let id = state.next_id;
    state.next_id += 1;
    tx["id"] = json!(id);
    state.transactions.push(tx.clone());
    (200, tx)
}

fn update_transaction(state: &mut State, id: &str, body: &str) -> (u16, Value) {
    let (Ok(id), Ok(mut tx)) = (id.parse::<i64>(), serde_json::from_str::<Value>(body)) else {
        return (422, json!({"detail": "invalid request"}));
    };
    match state.transactions.iter_mut().find(|t| t["id"] == id) {
        Some(existing) => {
            tx["id"] = json!(id);
            *existing = tx.clone();
            (200, tx)
        }
        None => (404, json!({"detail": "Transaction not found"})),
    }
}

fn delete_transaction(state: &mut State, id: &str) -> (u16, Value) {
    let Ok(id) = id.parse::<i64>() else {
        return (422, json!({"detail": "invalid id"}));
    };
    let before = state.transactions.len();
    state.transactions.retain(|t| t["id"] != id);
    if state.transactions.len() < before {
        (200, json!({"message": "Transaction deleted successfully"}))
    } else {
        (404, json!({"detail": "Transaction not found"}))
    }
}

fn rename_account(state: &mut State, id: &str, body: &str) -> (u16, Value) {
    let name = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["name"].as_str().map(str::to_string));
    let (Ok(id), Some(name)) = (id.parse::<i64>(), name) else {
        return (422, json!({"detail": "invalid request"}));
    };
    match state.accounts.iter_mut().find(|a| a["id"] == id) {
        Some(account) => {
            account["name"] = json!(name);
            (200, account.clone())
        }
        None => (404, json!({"detail": "Account not found"})),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
