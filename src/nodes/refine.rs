use async_trait::async_trait;

use super::{
    model_input, texture_guidance, texture_image_input, texture_prompt_input, validate_guidance,
    ExecutionContext, MeshyNode, NodeOutput,
};
use crate::error::{Result, ValidationError};
use crate::schema::{InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_TASK_ID};
use crate::types::{AiModel, ImageInput, JobRequest, ModelResult, RefineRequest};

/// Inputs of the refine node.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineInputs {
    pub model: AiModel,
    /// Task id of the draft produced by text-to-model.
    pub meshy_task_id: String,
    pub enable_pbr: bool,
    pub texture_prompt: String,
    pub texture_image: Option<ImageInput>,
}

impl RefineInputs {
    pub fn new(meshy_task_id: impl Into<String>) -> Self {
        Self {
            model: AiModel::Latest,
            meshy_task_id: meshy_task_id.into(),
            enable_pbr: false,
            texture_prompt: String::new(),
            texture_image: None,
        }
    }

    pub fn enable_pbr(mut self, enable: bool) -> Self {
        self.enable_pbr = enable;
        self
    }

    pub fn texture_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.texture_prompt = prompt.into();
        self
    }

    pub fn texture_image(mut self, image: ImageInput) -> Self {
        self.texture_image = Some(image);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.meshy_task_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "meshy_task_id",
            });
        }
        validate_guidance(&self.texture_prompt, self.texture_image.is_some()).map(|_| ())
    }
}

/// Map inputs plus the uploaded texture URL (if any) to a refine request.
pub fn build_request(
    inputs: &RefineInputs,
    texture_image_url: Option<String>,
) -> std::result::Result<RefineRequest, ValidationError> {
    inputs.validate()?;
    Ok(RefineRequest {
        mode: "refine",
        preview_task_id: inputs.meshy_task_id.clone(),
        enable_pbr: inputs.enable_pbr,
        guidance: texture_guidance(&inputs.texture_prompt, texture_image_url)?,
        ai_model: inputs.model,
        moderation: false,
    })
}

/// `Meshy: Refine Draft Model`: textures a previously created draft.
pub struct RefineNode;

#[async_trait]
impl MeshyNode for RefineNode {
    type Inputs = RefineInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node(
            "MeshyRefineNode",
            "Meshy: Refine Draft Model",
            PriceBadge::fixed(0.4),
        )
        .description("Refine a previously created draft model.")
        .inputs(vec![
            model_input(),
            InputSpec::custom("meshy_task_id", MESHY_TASK_ID),
            InputSpec::boolean("enable_pbr", false).tooltip(
                "Generate PBR Maps (metallic, roughness, normal) in addition to the base color. \
                 Note: this should be set to false when using Sculpture style, \
                 as Sculpture style generates its own set of PBR maps.",
            ),
            texture_prompt_input(),
            texture_image_input(),
        ])
        .outputs(vec![
            OutputSpec::string("model_file"),
            OutputSpec::custom(MESHY_TASK_ID, "meshy_task_id"),
        ])
    }

    async fn execute(ctx: &ExecutionContext, inputs: RefineInputs) -> Result<NodeOutput> {
        inputs.validate()?;
        let texture_image_url = match &inputs.texture_image {
            Some(image) => Some(ctx.upload(image).await?),
            None => None,
        };
        let request = build_request(&inputs, texture_image_url)?;
        ctx.run::<ModelResult>(JobRequest::Refine(request)).await
    }
}
