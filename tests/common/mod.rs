// tests/common/mod.rs
//
// Tiny canned-response HTTP server for the integration tests: routes are
// keyed by (method, path), the path with its query string winning over
// the bare path, and every request is counted so tests can assert how
// often an endpoint was hit.
//
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
struct Route {
    status: u16,
    body: String,
}

type Key = (String, String); // (method, path)

#[derive(Clone)]
pub struct TestServer {
    base: String,
    routes: Arc<Mutex<HashMap<Key, Route>>>,
    hits: Arc<Mutex<HashMap<Key, usize>>>,
}

impl TestServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = Self {
            base,
            routes: Arc::new(Mutex::new(HashMap::new())),
            hits: Arc::new(Mutex::new(HashMap::new())),
        };
        let worker = server.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                worker.handle(stream);
            }
        });
        server
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Route {
                status,
                body: body.to_string(),
            },
        );
    }

    /// How many requests hit `method path` (path exactly as requested,
    /// query string included).
    pub fn hits(&self, method: &str, path: &str) -> usize {
        *self
            .hits
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .unwrap_or(&0)
    }

    fn handle(&self, stream: TcpStream) {
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }
        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
            return;
        };
        let method = method.to_string();
        let target = target.to_string();

        // Drain headers and body so the client can finish writing
        // before we answer.
        let mut content_length = 0usize;
        let mut chunked = false;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) if line.trim().is_empty() => break,
                Ok(_) => {
                    let lower = line.to_ascii_lowercase();
                    if let Some(v) = lower.strip_prefix("content-length:") {
                        content_length = v.trim().parse().unwrap_or(0);
                    }
                    if lower.starts_with("transfer-encoding:") && lower.contains("chunked") {
                        chunked = true;
                    }
                }
                Err(_) => return,
            }
        }
        if chunked {
            loop {
                let mut size_line = String::new();
                if reader.read_line(&mut size_line).is_err() {
                    break;
                }
                let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
                let mut chunk = vec![0u8; size + 2]; // chunk + CRLF
                let _ = reader.read_exact(&mut chunk);
                if size == 0 {
                    break;
                }
            }
        } else if content_length > 0 {
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);
        }

        *self
            .hits
            .lock()
            .unwrap()
            .entry((method.clone(), target.clone()))
            .or_insert(0) += 1;

        let bare = target.split('?').next().unwrap_or("").to_string();
        let route = {
            let routes = self.routes.lock().unwrap();
            routes
                .get(&(method.clone(), target.clone()))
                .or_else(|| routes.get(&(method, bare)))
                .cloned()
        };
        let (status, body) = match route {
            Some(r) => (r.status, r.body),
            None => (404, String::new()),
        };

        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "",
        };
        let reply = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        let mut stream = reader.into_inner();
        let _ = stream.write_all(reply.as_bytes());
        let _ = stream.flush();
    }
}
