use async_trait::async_trait;

use super::{
    model_input, pose_input, random_seed, remesh_input, seed_input, symmetry_input,
    texture_input, validate_remesh, validate_seed, ExecutionContext, MeshyNode, NodeOutput,
    TextureInput,
};
use crate::error::{Result, ValidationError};
use crate::schema::{InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_TASK_ID};
use crate::types::{
    AiModel, ImageInput, ImageToModelRequest, JobRequest, ModelResult, PoseMode, Remesh,
    SymmetryMode,
};

/// Inputs of the image-to-model node.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageToModelInputs {
    pub model: AiModel,
    pub image: ImageInput,
    pub should_remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    pub should_texture: TextureInput,
    pub pose_mode: PoseMode,
    pub seed: u32,
}

impl ImageToModelInputs {
    pub fn new(image: ImageInput) -> Self {
        Self {
            model: AiModel::Latest,
            image,
            should_remesh: Remesh::default(),
            symmetry_mode: SymmetryMode::Auto,
            should_texture: TextureInput::default(),
            pose_mode: PoseMode::None,
            seed: 0,
        }
    }

    pub fn remesh(mut self, remesh: Remesh) -> Self {
        self.should_remesh = remesh;
        self
    }

    pub fn texture(mut self, texture: TextureInput) -> Self {
        self.should_texture = texture;
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

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_remesh(&self.should_remesh)?;
        self.should_texture.validate()?;
        validate_seed(self.seed)?;
        Ok(())
    }
}

/// Map inputs plus uploaded URLs to an image-to-model request.
pub fn build_request(
    inputs: &ImageToModelInputs,
    image_url: String,
    texture_image_url: Option<String>,
) -> std::result::Result<ImageToModelRequest, ValidationError> {
    inputs.validate()?;
    Ok(ImageToModelRequest {
        image_url,
        ai_model: inputs.model,
        remesh: inputs.should_remesh,
        symmetry_mode: inputs.symmetry_mode,
        texturing: inputs.should_texture.to_texturing(texture_image_url)?,
        pose_mode: inputs.pose_mode,
        seed: inputs.seed,
        moderation: false,
    })
}

/// `Meshy: Image to Model`: generates a model from one reference image.
pub struct ImageToModelNode;

#[async_trait]
impl MeshyNode for ImageToModelNode {
    type Inputs = ImageToModelInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node(
            "MeshyImageToModelNode",
            "Meshy: Image to Model",
            PriceBadge::by_widget("should_texture", &[("true", 1.2), ("false", 0.8)]),
        )
        .inputs(vec![
            model_input(),
            InputSpec::image("image"),
            remesh_input(),
            symmetry_input(),
            texture_input(),
            pose_input(),
            seed_input(),
        ])
        .outputs(vec![
            OutputSpec::string("model_file"),
            OutputSpec::custom(MESHY_TASK_ID, "meshy_task_id"),
        ])
    }

    async fn execute(ctx: &ExecutionContext, inputs: ImageToModelInputs) -> Result<NodeOutput> {
        inputs.validate()?;
        let texture_image_url = match inputs.should_texture.image() {
            Some(image) => Some(ctx.upload(image).await?),
            None => None,
        };
        let image_url = ctx.upload(&inputs.image).await?;
        let request = build_request(&inputs, image_url, texture_image_url)?;
        ctx.run::<ModelResult>(JobRequest::ImageToModel(request))
            .await
    }
}
