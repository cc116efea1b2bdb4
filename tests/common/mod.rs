//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use req_dispatch::observability::logging::{LogData, LogSink};

/// Serve `app` on an ephemeral local port.
pub async fn start_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a programmable backend answering each connection with `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Log sink keeping every entry for assertions.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(Vec<String>, LogData)>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<(Vec<String>, LogData)> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries whose tag set contains every tag in `tags`.
    pub fn tagged(&self, tags: &[&str]) -> Vec<LogData> {
        self.entries()
            .into_iter()
            .filter(|(entry_tags, _)| tags.iter().all(|t| entry_tags.iter().any(|e| e == t)))
            .map(|(_, data)| data)
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|(_, data)| match data {
                LogData::Message(message) => Some(message),
                LogData::Call(_) => None,
            })
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, tags: &[&str], data: LogData) {
        let tags = tags.iter().map(|t| t.to_string()).collect();
        self.entries.lock().unwrap().push((tags, data));
    }
}
