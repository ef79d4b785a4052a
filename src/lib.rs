//! # meshy-nodes
//!
//! Async Rust nodes for the [Meshy](https://www.meshy.ai) 3D generation API,
//! reached through the Comfy API proxy.
//!
//! Seven nodes cover the Meshy workflow: text to model, refine, image to
//! model, multi-image to model, rigging, animation and retexturing. Each one
//! validates its inputs, uploads any images, submits a task, polls it to a
//! terminal status and downloads the resulting `.glb` into the output
//! directory. Every node also publishes a declarative [`NodeSchema`] that a
//! host UI can render.
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshy_nodes::{ExecutionContext, MeshyConfig, MeshyNode, TextToModelInputs, TextToModelNode};
//!
//! # async fn example() -> meshy_nodes::Result<()> {
//! let ctx = ExecutionContext::from_config(MeshyConfig::from_env())
//!     .with_progress(|p| println!("{} {}%", p.status, p.progress));
//!
//! let draft = TextToModelNode::execute(&ctx, TextToModelInputs::new("a red chair")).await?;
//! println!("saved {} (task {})", draft.path.display(), draft.task_id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod artifact;
pub mod client;
pub mod config;
pub mod error;
pub mod nodes;
pub mod schema;
pub mod task;
pub mod types;
pub mod validation;

pub use api::MeshyApi;
pub use client::MeshyClient;
pub use config::{MeshyConfig, MeshyConfigBuilder};
pub use error::{MeshyError, Result, ValidationError};
pub use nodes::{
    node_schemas, AnimateInputs, AnimateModelNode, ExecutionContext, ImageToModelInputs,
    ImageToModelNode, MeshyNode, MultiImageToModelInputs, MultiImageToModelNode, NodeOutput,
    RefineInputs, RefineNode, RetextureInputs, RigInputs, RigModelNode, TextToModelInputs,
    TextToModelNode, TextureInput, TextureNode,
};
pub use schema::{NodeSchema, PriceBadge};
pub use task::{PollConfig, Poller, ProgressUpdate, TaskHandle};
pub use types::{
    ArtStyle, ImageInput, PoseMode, Remesh, SymmetryMode, TaskKind, TaskStatus, Topology,
};
