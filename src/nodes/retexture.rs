use async_trait::async_trait;

use super::{model_input, ExecutionContext, MeshyNode, NodeOutput};
use crate::error::{Result, ValidationError};
use crate::schema::{
    InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_TASK_ID, MODEL_TASK_ID,
};
use crate::types::{AiModel, ImageInput, JobRequest, ModelResult, RetextureRequest, StyleGuidance};
use crate::validation;

/// Inputs of the texture node. Exactly one of `text_style_prompt` and
/// `image_style` must be given.
#[derive(Debug, Clone, PartialEq)]
pub struct RetextureInputs {
    pub model: AiModel,
    pub meshy_task_id: String,
    pub enable_original_uv: bool,
    pub pbr: bool,
    pub text_style_prompt: String,
    pub image_style: Option<ImageInput>,
}

impl RetextureInputs {
    pub fn new(meshy_task_id: impl Into<String>) -> Self {
        Self {
            model: AiModel::Latest,
            meshy_task_id: meshy_task_id.into(),
            enable_original_uv: true,
            pbr: false,
            text_style_prompt: String::new(),
            image_style: None,
        }
    }

    pub fn text_style(mut self, prompt: impl Into<String>) -> Self {
        self.text_style_prompt = prompt.into();
        self
    }

    pub fn image_style(mut self, image: ImageInput) -> Self {
        self.image_style = Some(image);
        self
    }

    pub fn pbr(mut self, enable: bool) -> Self {
        self.pbr = enable;
        self
    }

    pub fn original_uv(mut self, enable: bool) -> Self {
        self.enable_original_uv = enable;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.meshy_task_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "meshy_task_id",
            });
        }
        let prompt =
            validation::validate_prompt("text_style_prompt", &self.text_style_prompt, false)?;
        check_style_choice(prompt.is_some(), self.image_style.is_some())
    }
}

fn check_style_choice(has_text: bool, has_image: bool) -> std::result::Result<(), ValidationError> {
    validation::exclusive("text_style_prompt", has_text, "image_style", has_image)?;
    if !has_text && !has_image {
        return Err(ValidationError::MissingOneOf {
            first: "text_style_prompt",
            second: "image_style",
        });
    }
    Ok(())
}

pub fn build_request(
    inputs: &RetextureInputs,
    image_style_url: Option<String>,
) -> std::result::Result<RetextureRequest, ValidationError> {
    if inputs.meshy_task_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "meshy_task_id",
        });
    }
    let prompt =
        validation::validate_prompt("text_style_prompt", &inputs.text_style_prompt, false)?;
    validation::exclusive(
        "text_style_prompt",
        prompt.is_some(),
        "image_style",
        image_style_url.is_some(),
    )?;
    let style = match (prompt, image_style_url) {
        (Some(prompt), _) => StyleGuidance::Text(prompt),
        (None, Some(url)) => StyleGuidance::ImageUrl(url),
        (None, None) => {
            return Err(ValidationError::MissingOneOf {
                first: "text_style_prompt",
                second: "image_style",
            })
        }
    };
    Ok(RetextureRequest {
        input_task_id: inputs.meshy_task_id.clone(),
        ai_model: inputs.model,
        enable_original_uv: inputs.enable_original_uv,
        enable_pbr: inputs.pbr,
        style,
    })
}

/// `Meshy: Texture Model`: applies a new texture to an existing model.
pub struct TextureNode;

#[async_trait]
impl MeshyNode for TextureNode {
    type Inputs = RetextureInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node("MeshyTextureNode", "Meshy: Texture Model", PriceBadge::fixed(0.4))
            .inputs(vec![
                model_input(),
                InputSpec::custom("meshy_task_id", MESHY_TASK_ID),
                InputSpec::boolean("enable_original_uv", true).tooltip(
                    "Use the original UV of the model instead of generating new UVs. \
                     When enabled, Meshy preserves existing textures from the uploaded model. \
                     If the model has no original UV, the quality of the output might not be as good.",
                ),
                InputSpec::boolean("pbr", false),
                InputSpec::string("text_style_prompt", true).tooltip(
                    "Describe your desired texture style of the object using text. \
                     Maximum 600 characters. Cannot be used at the same time as 'image_style'.",
                ),
                InputSpec::image("image_style")
                    .optional()
                    .tooltip(
                        "A 2d image to guide the texturing process. \
                         Can not be used at the same time with 'text_style_prompt'.",
                    ),
            ])
            .outputs(vec![
                OutputSpec::string("model_file"),
                OutputSpec::custom(MODEL_TASK_ID, "meshy_task_id"),
            ])
    }

    async fn execute(ctx: &ExecutionContext, inputs: RetextureInputs) -> Result<NodeOutput> {
        inputs.validate()?;
        let image_style_url = match &inputs.image_style {
            Some(image) => Some(ctx.upload(image).await?),
            None => None,
        };
        let request = build_request(&inputs, image_style_url)?;
        ctx.run::<ModelResult>(JobRequest::Retexture(request))
            .await
    }
}
