//! The seven Meshy nodes and the context they execute in.
//!
//! Every node runs the same sequence: validate inputs, upload images,
//! build the typed request, submit, poll until terminal, then download
//! `meshy_model_<task id>.glb` into the output directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::api::{self, MeshyApi};
use crate::artifact;
use crate::client::MeshyClient;
use crate::config::MeshyConfig;
use crate::error::{Result, ValidationError};
use crate::schema::{DynamicOption, InputSpec, NodeSchema};
use crate::task::{Poller, ProgressUpdate, TaskSnapshot};
use crate::types::{
    AiModel, ImageInput, JobRequest, PoseMode, Remesh, SymmetryMode, TextureGuidance, Texturing,
    Topology,
};
use crate::validation::{self, POLYCOUNT_RANGE, SEED_RANGE};

pub mod animate;
pub mod image_to_model;
pub mod multi_image_to_model;
pub mod refine;
pub mod retexture;
pub mod rig;
pub mod text_to_model;

pub use animate::{AnimateInputs, AnimateModelNode};
pub use image_to_model::{ImageToModelInputs, ImageToModelNode};
pub use multi_image_to_model::{MultiImageToModelInputs, MultiImageToModelNode};
pub use refine::{RefineInputs, RefineNode};
pub use retexture::{RetextureInputs, TextureNode};
pub use rig::{RigInputs, RigModelNode};
pub use text_to_model::{TextToModelInputs, TextToModelNode};

/// Callback receiving progress after every status poll.
pub type ProgressCallback = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// A node: declarative schema plus an execute routine.
#[async_trait]
pub trait MeshyNode {
    type Inputs: Send + 'static;

    fn schema() -> NodeSchema;

    async fn execute(ctx: &ExecutionContext, inputs: Self::Inputs) -> Result<NodeOutput>;
}

/// What a node hands back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOutput {
    /// File name relative to the output directory.
    pub model_file: String,
    /// Absolute or output-dir-relative path the model was written to.
    pub path: PathBuf,
    /// Task id, wired into downstream nodes (refine, rig, animate, texture).
    pub task_id: String,
}

/// Everything a node needs at run time.
#[derive(Clone)]
pub struct ExecutionContext {
    api: Arc<dyn MeshyApi>,
    poller: Poller,
    output_dir: PathBuf,
    node_id: Option<String>,
    on_progress: Option<ProgressCallback>,
}

impl ExecutionContext {
    /// Use an existing API implementation with the poll and output settings
    /// from `config`.
    pub fn new(api: Arc<dyn MeshyApi>, config: &MeshyConfig) -> Self {
        Self {
            api,
            poller: Poller::new(config.poll.clone()),
            output_dir: config.output_dir.clone(),
            node_id: None,
            on_progress: None,
        }
    }

    /// Build a [`MeshyClient`] from `config` and wrap it.
    pub fn from_config(config: MeshyConfig) -> Self {
        let client = MeshyClient::new(config.clone());
        Self::new(Arc::new(client), &config)
    }

    /// Receive a [`ProgressUpdate`] after every poll.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressUpdate) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Stop polling once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.poller = self.poller.with_cancellation(flag);
        self
    }

    /// Host-assigned id of the node being executed, used in logs.
    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn api(&self) -> &dyn MeshyApi {
        self.api.as_ref()
    }

    pub(crate) async fn upload(&self, image: &ImageInput) -> Result<String> {
        self.api.upload_image(image).await
    }

    pub(crate) async fn upload_all(&self, images: &[ImageInput]) -> Result<Vec<String>> {
        api::upload_images(self.api.as_ref(), images).await
    }

    /// Submit, wait for a terminal status, and download the model.
    pub(crate) async fn run<R: TaskSnapshot>(&self, request: JobRequest) -> Result<NodeOutput> {
        let kind = request.kind();
        let body = request.to_body()?;
        let handle = self.api.submit(kind, body).await?;
        info!(
            node_id = self.node_id.as_deref().unwrap_or("-"),
            %kind,
            task_id = %handle,
            "waiting for Meshy task"
        );

        let result: R = self
            .poller
            .wait(self.api.as_ref(), kind, &handle, |update| {
                if let Some(callback) = &self.on_progress {
                    callback(update);
                }
            })
            .await?;

        let model_file = artifact::model_file_name(&handle);
        let path = artifact::model_path(&self.output_dir, &handle);
        self.api.fetch(result.artifact_url(), &path).await?;
        Ok(NodeOutput {
            model_file,
            path,
            task_id: handle.into_inner(),
        })
    }
}

/// Schemas of every Meshy node, in display order.
pub fn node_schemas() -> Vec<NodeSchema> {
    vec![
        TextToModelNode::schema(),
        RefineNode::schema(),
        ImageToModelNode::schema(),
        MultiImageToModelNode::schema(),
        RigModelNode::schema(),
        AnimateModelNode::schema(),
        TextureNode::schema(),
    ]
}

/// A seed the host can use when re-rolling after a run.
pub fn random_seed() -> u32 {
    rand::rng().random_range(SEED_RANGE)
}

// ── Shared input handling ───────────────────────────────────────────

/// UI-level texture settings before any upload has happened.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureInput {
    Enabled {
        enable_pbr: bool,
        texture_prompt: String,
        texture_image: Option<ImageInput>,
    },
    Disabled,
}

impl Default for TextureInput {
    fn default() -> Self {
        TextureInput::Enabled {
            enable_pbr: false,
            texture_prompt: String::new(),
            texture_image: None,
        }
    }
}

impl TextureInput {
    /// Image that must be uploaded before the request can be built.
    pub fn image(&self) -> Option<&ImageInput> {
        match self {
            TextureInput::Enabled { texture_image, .. } => texture_image.as_ref(),
            TextureInput::Disabled => None,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        match self {
            TextureInput::Enabled {
                texture_prompt,
                texture_image,
                ..
            } => validate_guidance(texture_prompt, texture_image.is_some()).map(|_| ()),
            TextureInput::Disabled => Ok(()),
        }
    }

    /// Convert to the request toggle. Nothing of a disabled input reaches the
    /// request, even if the UI captured values.
    pub fn to_texturing(
        &self,
        texture_image_url: Option<String>,
    ) -> std::result::Result<Texturing, ValidationError> {
        match self {
            TextureInput::Enabled {
                enable_pbr,
                texture_prompt,
                ..
            } => Ok(Texturing::Enabled {
                enable_pbr: *enable_pbr,
                guidance: texture_guidance(texture_prompt, texture_image_url)?,
            }),
            TextureInput::Disabled => Ok(Texturing::Disabled),
        }
    }
}

/// Check a texture prompt / texture image pair. Returns the normalized prompt.
pub(crate) fn validate_guidance(
    texture_prompt: &str,
    has_image: bool,
) -> std::result::Result<Option<String>, ValidationError> {
    let prompt = validation::validate_prompt("texture_prompt", texture_prompt, false)?;
    validation::exclusive("texture_prompt", prompt.is_some(), "texture_image", has_image)?;
    Ok(prompt)
}

pub(crate) fn texture_guidance(
    texture_prompt: &str,
    texture_image_url: Option<String>,
) -> std::result::Result<TextureGuidance, ValidationError> {
    let prompt = validate_guidance(texture_prompt, texture_image_url.is_some())?;
    Ok(match (prompt, texture_image_url) {
        (Some(prompt), _) => TextureGuidance::Prompt(prompt),
        (None, Some(url)) => TextureGuidance::ImageUrl(url),
        (None, None) => TextureGuidance::None,
    })
}

pub(crate) fn validate_remesh(remesh: &Remesh) -> std::result::Result<(), ValidationError> {
    if let Remesh::Enabled {
        target_polycount, ..
    } = remesh
    {
        validation::check_range("target_polycount", *target_polycount, &POLYCOUNT_RANGE)?;
    }
    Ok(())
}

pub(crate) fn validate_seed(seed: u32) -> std::result::Result<u32, ValidationError> {
    validation::check_range("seed", seed, &SEED_RANGE)
}

// ── Shared schema pieces ────────────────────────────────────────────

pub(crate) fn model_input() -> InputSpec {
    InputSpec::combo("model", AiModel::ALL.iter().map(|m| m.as_str()))
}

pub(crate) fn remesh_input() -> InputSpec {
    InputSpec::dynamic_combo(
        "should_remesh",
        vec![
            DynamicOption::new(
                "true",
                vec![
                    InputSpec::combo("topology", Topology::ALL.iter().map(|t| t.as_str())),
                    InputSpec::int(
                        "target_polycount",
                        *POLYCOUNT_RANGE.start() as i64,
                        *POLYCOUNT_RANGE.end() as i64,
                        300_000,
                    ),
                ],
            ),
            DynamicOption::new("false", vec![]),
        ],
    )
    .tooltip("When set to false, returns an unprocessed triangular mesh.")
}

pub(crate) fn symmetry_input() -> InputSpec {
    InputSpec::combo("symmetry_mode", SymmetryMode::ALL.iter().map(|s| s.as_str()))
}

pub(crate) fn texture_input() -> InputSpec {
    InputSpec::dynamic_combo(
        "should_texture",
        vec![
            DynamicOption::new(
                "true",
                vec![
                    InputSpec::boolean("enable_pbr", false).tooltip(
                        "Generate PBR Maps (metallic, roughness, normal) in addition to the base color.",
                    ),
                    texture_prompt_input(),
                    texture_image_input(),
                ],
            ),
            DynamicOption::new("false", vec![]),
        ],
    )
    .tooltip(
        "Determines whether textures are generated. \
         Setting it to false skips the texture phase and returns a mesh without textures.",
    )
}

pub(crate) fn texture_prompt_input() -> InputSpec {
    InputSpec::string("texture_prompt", true).tooltip(
        "Provide a text prompt to guide the texturing process. \
         Maximum 600 characters. Cannot be used at the same time as 'texture_image'.",
    )
}

pub(crate) fn texture_image_input() -> InputSpec {
    InputSpec::image("texture_image")
        .tooltip("Only one of 'texture_image' or 'texture_prompt' may be used at the same time.")
        .optional()
}

pub(crate) fn pose_input() -> InputSpec {
    InputSpec::combo("pose_mode", PoseMode::ALL.iter().map(|p| p.label()))
        .tooltip("Specify the pose mode for the generated model.")
}

pub(crate) fn seed_input() -> InputSpec {
    InputSpec::int("seed", 0, *SEED_RANGE.end() as i64, 0)
        .control_after_generate()
        .tooltip(
            "Seed controls whether the node should re-run; \
             results are non-deterministic regardless of seed.",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputKind;

    #[test]
    fn test_node_schemas_registered() {
        let schemas = node_schemas();
        let ids: Vec<&str> = schemas.iter().map(|s| s.node_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "MeshyTextToModelNode",
                "MeshyRefineNode",
                "MeshyImageToModelNode",
                "MeshyMultiImageToModelNode",
                "MeshyRigModelNode",
                "MeshyAnimateModelNode",
                "MeshyTextureNode",
            ]
        );
        assert!(schemas.iter().all(|s| s.category == "api node/3d/Meshy"));
    }

    #[test]
    fn test_random_seed_in_range() {
        for _ in 0..100 {
            assert!(SEED_RANGE.contains(&random_seed()));
        }
    }

    #[test]
    fn test_disabled_texture_ignores_captured_values() {
        let texturing = TextureInput::Disabled.to_texturing(None).unwrap();
        assert_eq!(texturing, Texturing::Disabled);
    }

    #[test]
    fn test_texture_prompt_and_image_conflict() {
        let input = TextureInput::Enabled {
            enable_pbr: false,
            texture_prompt: "mossy stone".into(),
            texture_image: Some(ImageInput::png(vec![1, 2, 3])),
        };
        assert_eq!(
            input.validate(),
            Err(ValidationError::MutuallyExclusive {
                first: "texture_prompt",
                second: "texture_image"
            })
        );
        assert!(input.to_texturing(Some("https://img".into())).is_err());
    }

    #[test]
    fn test_empty_texture_prompt_is_not_provided() {
        let guidance = texture_guidance("", Some("https://img/t.png".into())).unwrap();
        assert_eq!(guidance, TextureGuidance::ImageUrl("https://img/t.png".into()));
        assert_eq!(texture_guidance("", None).unwrap(), TextureGuidance::None);
    }

    #[test]
    fn test_remesh_polycount_bounds() {
        let ok = Remesh::Enabled {
            topology: Topology::Quad,
            target_polycount: 100,
        };
        assert!(validate_remesh(&ok).is_ok());
        let low = Remesh::Enabled {
            topology: Topology::Quad,
            target_polycount: 99,
        };
        assert!(validate_remesh(&low).is_err());
        assert!(validate_remesh(&Remesh::Disabled).is_ok());
    }

    #[test]
    fn test_remesh_schema_bounds() {
        let input = remesh_input();
        match &input.kind {
            InputKind::DynamicCombo { options } => {
                assert_eq!(options.len(), 2);
                match &options[0].inputs[1].kind {
                    InputKind::Int { min, max, default, .. } => {
                        assert_eq!((*min, *max, *default), (100, 300_000, 300_000));
                    }
                    other => panic!("unexpected kind {:?}", other),
                }
                assert!(options[1].inputs.is_empty());
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_pose_labels() {
        match pose_input().kind {
            InputKind::Combo { options } => assert_eq!(options, vec!["", "A-pose", "T-pose"]),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
