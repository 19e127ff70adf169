//! Scripted in-memory transport for sync client tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_client::{Transport, TransportError};
use parking_lot::Mutex;
use tokio::time::Instant;

pub const BASE_URL: &str = "http://sim.test:8080";
pub const STATE_PATH: &str = "/api/environment/state";
pub const ALERTS_PATH: &str = "/api/environment/alerts";
pub const MESSAGES_PATH: &str = "/api/environment/agents/messages";

pub fn heating_path(room_id: &str) -> String {
    format!("/api/environment/rooms/{room_id}/heating")
}

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Reply {
    Json(String),
    Refused,
    Timeout,
    Status(u16),
}

impl Reply {
    fn into_result(self, url: &str) -> Result<Bytes, TransportError> {
        match self {
            Reply::Json(body) => Ok(Bytes::from(body)),
            Reply::Refused => Err(TransportError::Network("connection refused".to_string())),
            Reply::Timeout => Err(TransportError::Timeout("operation timed out".to_string())),
            Reply::Status(status) => Err(TransportError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// Replays scripted replies per path; the last reply of a script repeats
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<(String, Instant)>>,
    requests: AtomicUsize,
    closed: AtomicBool,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, path: impl Into<String>, replies: Vec<Reply>) {
        self.scripts.lock().insert(path.into(), replies.into());
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|(p, _)| p == path).count()
    }

    pub fn request_times(&self, path: &str) -> Vec<Instant> {
        self.log
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, at)| *at)
            .collect()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Status(500)),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(500)),
            None => Reply::Status(404),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        let path = url
            .strip_prefix(BASE_URL)
            .unwrap_or(url)
            .to_string();
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push((path.clone(), Instant::now()));

        self.next_reply(&path).into_result(url)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub fn room_json(id: &str, temperature: f64) -> String {
    format!(
        r#"{{"id":"{id}","name":"Room {id}","lights":[{{"id":"l-{id}","roomId":"{id}","state":"ON","brightness":70}}],
            "motionSensor":{{"id":"m-{id}","roomId":"{id}","motionDetected":false}},
            "temperatureSensor":{{"id":"t-{id}","roomId":"{id}","temperature":{temperature}}},
            "peopleCount":1}}"#
    )
}

pub fn state_json(time: &str, room_ids: &[&str]) -> Reply {
    let rooms: Vec<String> = room_ids.iter().map(|id| room_json(id, 21.5)).collect();
    Reply::Json(format!(
        r#"{{"simulationTime":"{time}","externalTemperature":4.5,"daylightIntensity":0.6,"rooms":[{}]}}"#,
        rooms.join(",")
    ))
}

pub fn alerts_json(ids: &[&str]) -> Reply {
    let alerts: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id":"{id}","type":"low_toner","message":"Toner low","timestamp":"t","severity":"warning"}}"#
            )
        })
        .collect();
    Reply::Json(format!("[{}]", alerts.join(",")))
}

pub fn heating_json(room_id: &str, active: bool) -> Reply {
    Reply::Json(format!(
        r#"{{"roomId":"{room_id}","heatingActive":{active}}}"#
    ))
}
