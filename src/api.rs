use std::path::Path;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde_json::Value;

use crate::error::Result;
use crate::task::TaskHandle;
use crate::types::{ImageInput, TaskKind};

/// The four calls every Meshy node is composed of.
///
/// [`MeshyClient`](crate::MeshyClient) talks to the real API proxy; tests
/// substitute scripted implementations.
#[async_trait]
pub trait MeshyApi: Send + Sync {
    /// Send a creation request. Returns the new task's handle.
    async fn submit(&self, kind: TaskKind, body: Value) -> Result<TaskHandle>;

    /// Fetch the current status payload for a task.
    async fn poll(&self, kind: TaskKind, handle: &TaskHandle) -> Result<Value>;

    /// Upload one image and return the URL the API can read it from.
    async fn upload_image(&self, image: &ImageInput) -> Result<String>;

    /// Download `url` into `dest`, replacing any existing file.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Upload several images concurrently. URLs come back in input order.
pub async fn upload_images(api: &dyn MeshyApi, images: &[ImageInput]) -> Result<Vec<String>> {
    try_join_all(images.iter().map(|image| api.upload_image(image))).await
}
