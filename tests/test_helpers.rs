use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use meshy_nodes::*;
use serde_json::{json, Value};

/// One call received by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit(TaskKind, Value),
    Poll(TaskKind, String),
    Upload(String),
    Fetch(String),
}

/// In-memory Meshy API: assigns a fixed task id, replays scripted status
/// payloads, and writes `fetch` targets with fixed bytes.
pub struct MockApi {
    task_id: String,
    statuses: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<Call>>,
}

pub const MODEL_BYTES: &[u8] = b"glTF-binary";

impl MockApi {
    pub fn new(task_id: &str, statuses: Vec<Value>) -> Self {
        Self {
            task_id: task_id.to_string(),
            statuses: Mutex::new(statuses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<(TaskKind, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(kind, body) => Some((kind, body)),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MeshyApi for MockApi {
    async fn submit(&self, kind: TaskKind, body: Value) -> Result<TaskHandle> {
        self.record(Call::Submit(kind, body));
        Ok(TaskHandle::new(self.task_id.clone()))
    }

    async fn poll(&self, kind: TaskKind, handle: &TaskHandle) -> Result<Value> {
        self.record(Call::Poll(kind, handle.to_string()));
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MeshyError::InvalidResponse("no more scripted statuses".into()))
    }

    async fn upload_image(&self, image: &ImageInput) -> Result<String> {
        self.record(Call::Upload(image.file_name.clone()));
        Ok(format!("https://uploads.test/{}", image.file_name))
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.record(Call::Fetch(url.to_string()));
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(dest, MODEL_BYTES).unwrap();
        Ok(())
    }
}

/// Status payload of a model-producing task.
pub fn model_status(id: &str, status: &str, progress: i64) -> Value {
    let glb = if status == "SUCCEEDED" {
        format!("https://assets.test/{}.glb", id)
    } else {
        String::new()
    };
    json!({
        "id": id,
        "type": "text-to-3d-preview",
        "model_urls": {"glb": glb},
        "thumbnail_url": "",
        "status": status,
        "progress": progress,
        "texture_urls": null,
        "task_error": {"message": ""}
    })
}

pub fn config_for(dir: &Path) -> MeshyConfig {
    MeshyConfig::builder()
        .with_poll_interval(std::time::Duration::from_millis(1))
        .with_output_dir(dir.to_path_buf())
        .build()
}
