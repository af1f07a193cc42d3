//! In-memory upstream and sink used by pipeline tests, plus a loopback
//! HTTP responder for exercising the real clients.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{AppError, Result};
use crate::models::{CreatedObservation, Observation, ObservationKind, RawReading};
use crate::services::{ObservationSink, UpstreamSource};
use crate::utils::format_window;

/// Upstream that answers from a `(code, YYYYMMDDHHMM)` table.
#[derive(Default)]
pub struct FakeUpstream {
    windows: HashMap<(String, String), Vec<RawReading>>,
    failing: HashMap<String, u16>,
    failing_windows: HashMap<(String, String), u16>,
    calls: Mutex<Vec<(String, String)>>,
    bootstraps: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, code: &str, instant: &str, readings: Vec<RawReading>) -> Self {
        self.windows
            .insert((code.to_string(), instant.to_string()), readings);
        self
    }

    /// Every request for `code` answers with `status`.
    pub fn failing_for(mut self, code: &str, status: u16) -> Self {
        self.failing.insert(code.to_string(), status);
        self
    }

    /// Only the request for `code` at `instant` answers with `status`.
    pub fn failing_at(mut self, code: &str, instant: &str, status: u16) -> Self {
        self.failing_windows
            .insert((code.to_string(), instant.to_string()), status);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bootstraps(&self) -> usize {
        self.bootstraps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn bootstrap(&self) -> Result<()> {
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn readings_at(&self, code: &str, instant: NaiveDateTime) -> Result<Vec<RawReading>> {
        let stamp = format_window(instant);
        self.calls
            .lock()
            .unwrap()
            .push((code.to_string(), stamp.clone()));

        let key = (code.to_string(), stamp);
        let status = self
            .failing
            .get(code)
            .or_else(|| self.failing_windows.get(&key));
        if let Some(status) = status {
            return Err(AppError::Upstream {
                status: *status,
                url: format!("fake://{}/{}", key.0, key.1),
            });
        }

        Ok(self.windows.get(&key).cloned().unwrap_or_default())
    }
}

/// Sink that records batches and echoes them back as created records.
#[derive(Default)]
pub struct FakeSink {
    failing_series: HashSet<i64>,
    uploads: Mutex<Vec<(i64, Vec<Observation>)>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads for `series_id` fail as a network error would.
    pub fn failing_for(mut self, series_id: i64) -> Self {
        self.failing_series.insert(series_id);
        self
    }

    pub fn uploads(&self) -> Vec<(i64, Vec<Observation>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObservationSink for FakeSink {
    async fn create_observations(
        &self,
        observations: &[Observation],
        series_id: i64,
        _kind: ObservationKind,
    ) -> Result<Vec<CreatedObservation>> {
        if observations.is_empty() {
            return Err(AppError::EmptyBatch(series_id));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((series_id, observations.to_vec()));

        if self.failing_series.contains(&series_id) {
            return Err(AppError::upload(series_id, "connection reset by peer"));
        }

        Ok(observations
            .iter()
            .enumerate()
            .map(|(i, obs)| CreatedObservation {
                id: Some(i as i64 + 1),
                timestart: Some(obs.timestart.clone()),
                timeend: Some(obs.timeend.clone()),
                valor: obs.valor,
                series_id: Some(series_id),
                extra: serde_json::Map::new(),
            })
            .collect())
    }
}

/// What the loopback server does with one accepted connection.
pub enum Reply {
    /// Read the request, then close without answering.
    Hangup,
    /// Answer with a status and a JSON body.
    Json(u16, &'static str),
}

/// Loopback HTTP/1.1 server answering one connection per scripted reply.
///
/// Once the script runs out the listener is dropped, so any further
/// request fails to connect.
pub struct CannedServer {
    pub url: String,
    connections: Arc<AtomicUsize>,
}

impl CannedServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        tokio::spawn(async move {
            for reply in script {
                let (mut stream, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut stream).await;
                if let Reply::Json(status, body) = reply {
                    let response = format!(
                        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    stream.write_all(response.as_bytes()).await.unwrap();
                    let _ = stream.shutdown().await;
                }
            }
        });

        Self { url, connections }
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Consume the request head and its `Content-Length` body.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut expected = None;

    loop {
        if expected.is_none() {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                expected = Some(pos + 4 + length);
            }
        }
        if expected.is_some_and(|total| buf.len() >= total) {
            return;
        }

        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
