use async_trait::async_trait;

use super::{
    model_input, pose_input, random_seed, remesh_input, seed_input, symmetry_input,
    texture_input, validate_remesh, validate_seed, ExecutionContext, MeshyNode, NodeOutput,
    TextureInput,
};
use crate::error::{Result, ValidationError};
use crate::schema::{InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_TASK_ID};
use crate::types::{
    AiModel, ImageInput, JobRequest, ModelResult, MultiImageToModelRequest, PoseMode, Remesh,
    SymmetryMode,
};
use crate::validation::{self, MULTI_IMAGE_COUNT};

/// Inputs of the multi-image-to-model node.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiImageToModelInputs {
    pub model: AiModel,
    /// Two to four views of the same object.
    pub images: Vec<ImageInput>,
    pub should_remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    pub should_texture: TextureInput,
    pub pose_mode: PoseMode,
    pub seed: u32,
}

impl MultiImageToModelInputs {
    pub fn new(images: Vec<ImageInput>) -> Self {
        Self {
            model: AiModel::Latest,
            images,
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

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_random_seed(self) -> Self {
        self.seed(random_seed())
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validation::check_image_count(self.images.len())?;
        validate_remesh(&self.should_remesh)?;
        self.should_texture.validate()?;
        validate_seed(self.seed)?;
        Ok(())
    }
}

/// Map inputs plus uploaded URLs (same order as `inputs.images`) to a request.
pub fn build_request(
    inputs: &MultiImageToModelInputs,
    image_urls: Vec<String>,
    texture_image_url: Option<String>,
) -> std::result::Result<MultiImageToModelRequest, ValidationError> {
    inputs.validate()?;
    validation::check_image_count(image_urls.len())?;
    Ok(MultiImageToModelRequest {
        image_urls,
        ai_model: inputs.model,
        remesh: inputs.should_remesh,
        symmetry_mode: inputs.symmetry_mode,
        texturing: inputs.should_texture.to_texturing(texture_image_url)?,
        pose_mode: inputs.pose_mode,
        seed: inputs.seed,
        moderation: false,
    })
}

/// `Meshy: Multi-Image to Model`: generates a model from 2-4 views.
pub struct MultiImageToModelNode;

#[async_trait]
impl MeshyNode for MultiImageToModelNode {
    type Inputs = MultiImageToModelInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node(
            "MeshyMultiImageToModelNode",
            "Meshy: Multi-Image to Model",
            PriceBadge::by_widget("should_texture", &[("true", 0.6), ("false", 0.2)]),
        )
        .inputs(vec![
            model_input(),
            InputSpec::autogrow(
                "images",
                InputSpec::image("image"),
                "image",
                *MULTI_IMAGE_COUNT.start(),
                *MULTI_IMAGE_COUNT.end(),
            ),
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

    async fn execute(
        ctx: &ExecutionContext,
        inputs: MultiImageToModelInputs,
    ) -> Result<NodeOutput> {
        inputs.validate()?;
        let texture_image_url = match inputs.should_texture.image() {
            Some(image) => Some(ctx.upload(image).await?),
            None => None,
        };
        let image_urls = ctx.upload_all(&inputs.images).await?;
        let request = build_request(&inputs, image_urls, texture_image_url)?;
        ctx.run::<ModelResult>(JobRequest::MultiImageToModel(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(n: usize) -> Vec<ImageInput> {
        (0..n)
            .map(|i| ImageInput::png(vec![i as u8]).with_file_name(format!("view{}.png", i)))
            .collect()
    }

    #[test]
    fn test_image_count_bounds() {
        assert!(MultiImageToModelInputs::new(views(1)).validate().is_err());
        assert!(MultiImageToModelInputs::new(views(2)).validate().is_ok());
        assert!(MultiImageToModelInputs::new(views(4)).validate().is_ok());
        assert!(MultiImageToModelInputs::new(views(5)).validate().is_err());
    }

    #[test]
    fn test_urls_keep_order() {
        let inputs = MultiImageToModelInputs::new(views(3)).remesh(Remesh::Disabled);
        let urls = vec!["u0".to_string(), "u1".to_string(), "u2".to_string()];
        let request = build_request(&inputs, urls.clone(), None).unwrap();
        assert_eq!(request.image_urls, urls);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("topology").is_none());
        assert_eq!(value["should_texture"], true);
    }
}
