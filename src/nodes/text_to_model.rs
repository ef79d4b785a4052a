use async_trait::async_trait;

use super::{
    model_input, pose_input, random_seed, remesh_input, seed_input, symmetry_input,
    validate_remesh, validate_seed, ExecutionContext, MeshyNode, NodeOutput,
};
use crate::error::{Result, ValidationError};
use crate::schema::{InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_TASK_ID};
use crate::types::{
    AiModel, ArtStyle, JobRequest, ModelResult, PoseMode, Remesh, SymmetryMode, TextToModelRequest,
};
use crate::validation;

/// Inputs of the text-to-model node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextToModelInputs {
    pub model: AiModel,
    pub prompt: String,
    pub style: ArtStyle,
    pub should_remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    pub pose_mode: PoseMode,
    pub seed: u32,
}

impl TextToModelInputs {
    /// Inputs with the widget defaults and the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: AiModel::Latest,
            prompt: prompt.into(),
            style: ArtStyle::Realistic,
            should_remesh: Remesh::default(),
            symmetry_mode: SymmetryMode::Auto,
            pose_mode: PoseMode::None,
            seed: 0,
        }
    }

    pub fn style(mut self, style: ArtStyle) -> Self {
        self.style = style;
        self
    }

    pub fn remesh(mut self, remesh: Remesh) -> Self {
        self.should_remesh = remesh;
        self
    }

    pub fn symmetry(mut self, mode: SymmetryMode) -> Self {
        self.symmetry_mode = mode;
        self
    }

    pub fn pose(mut self, pose: PoseMode) -> Self {
        self.pose_mode = pose;
        self
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_random_seed(self) -> Self {
        self.seed(random_seed())
    }
}

/// Map validated inputs to the preview request.
pub fn build_request(
    inputs: &TextToModelInputs,
) -> std::result::Result<TextToModelRequest, ValidationError> {
    let prompt = validation::validate_prompt("prompt", &inputs.prompt, true)?
        .ok_or(ValidationError::Required { field: "prompt" })?;
    validate_remesh(&inputs.should_remesh)?;
    let seed = validate_seed(inputs.seed)?;

    Ok(TextToModelRequest {
        mode: "preview",
        prompt,
        art_style: inputs.style,
        ai_model: inputs.model,
        remesh: inputs.should_remesh,
        symmetry_mode: inputs.symmetry_mode,
        pose_mode: inputs.pose_mode,
        seed,
        moderation: false,
    })
}

/// `Meshy: Text to Model`: generates a draft model from a prompt.
pub struct TextToModelNode;

#[async_trait]
impl MeshyNode for TextToModelNode {
    type Inputs = TextToModelInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node(
            "MeshyTextToModelNode",
            "Meshy: Text to Model",
            PriceBadge::fixed(0.8),
        )
        .inputs(vec![
            model_input(),
            InputSpec::string("prompt", true),
            InputSpec::combo("style", ArtStyle::ALL.iter().map(|s| s.as_str())),
            remesh_input(),
            symmetry_input(),
            pose_input(),
            seed_input(),
        ])
        .outputs(vec![
            OutputSpec::string("model_file"),
            OutputSpec::custom(MESHY_TASK_ID, "meshy_task_id"),
        ])
    }

    async fn execute(ctx: &ExecutionContext, inputs: TextToModelInputs) -> Result<NodeOutput> {
        let request = build_request(&inputs)?;
        ctx.run::<ModelResult>(JobRequest::TextToModel(request))
            .await
    }
}
