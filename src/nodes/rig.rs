use async_trait::async_trait;

use super::{ExecutionContext, MeshyNode, NodeOutput};
use crate::error::{Result, ValidationError};
use crate::schema::{
    InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_RIGGED_TASK_ID, MESHY_TASK_ID,
};
use crate::types::{ImageInput, JobRequest, RiggedResult, RiggingRequest};
use crate::validation::{self, HEIGHT_METERS_RANGE};

/// Inputs of the rig node.
#[derive(Debug, Clone, PartialEq)]
pub struct RigInputs {
    pub meshy_task_id: String,
    /// Approximate character height, used for scaling the skeleton.
    pub height_meters: f64,
    /// UV-unwrapped base color texture of the model.
    pub texture_image: Option<ImageInput>,
}

impl RigInputs {
    pub fn new(meshy_task_id: impl Into<String>) -> Self {
        Self {
            meshy_task_id: meshy_task_id.into(),
            height_meters: 1.7,
            texture_image: None,
        }
    }

    pub fn height(mut self, meters: f64) -> Self {
        self.height_meters = meters;
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
        validation::check_range("height_meters", self.height_meters, &HEIGHT_METERS_RANGE)?;
        Ok(())
    }
}

pub fn build_request(
    inputs: &RigInputs,
    texture_image_url: Option<String>,
) -> std::result::Result<RiggingRequest, ValidationError> {
    inputs.validate()?;
    Ok(RiggingRequest {
        input_task_id: inputs.meshy_task_id.clone(),
        height_meters: inputs.height_meters,
        texture_image_url,
    })
}

/// `Meshy: Rig Model`: auto-rigs a humanoid character.
pub struct RigModelNode;

#[async_trait]
impl MeshyNode for RigModelNode {
    type Inputs = RigInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node("MeshyRigModelNode", "Meshy: Rig Model", PriceBadge::fixed(0.2))
            .description(
                "Provides a rigged character in standard formats. \
                 Auto-rigging is currently not suitable for untextured meshes, non-humanoid assets, \
                 or humanoid assets with unclear limb and body structure.",
            )
            .inputs(vec![
                InputSpec::custom("meshy_task_id", MESHY_TASK_ID),
                InputSpec::float(
                    "height_meters",
                    *HEIGHT_METERS_RANGE.start(),
                    *HEIGHT_METERS_RANGE.end(),
                    1.7,
                )
                .tooltip(
                    "The approximate height of the character model in meters. \
                     This aids in scaling and rigging accuracy.",
                ),
                InputSpec::image("texture_image")
                    .tooltip("The model's UV-unwrapped base color texture image.")
                    .optional(),
            ])
            .outputs(vec![
                OutputSpec::string("model_file"),
                OutputSpec::custom(MESHY_RIGGED_TASK_ID, "rig_task_id"),
            ])
    }

    async fn execute(ctx: &ExecutionContext, inputs: RigInputs) -> Result<NodeOutput> {
        inputs.validate()?;
        let texture_image_url = match &inputs.texture_image {
            Some(image) => Some(ctx.upload(image).await?),
            None => None,
        };
        let request = build_request(&inputs, texture_image_url)?;
        ctx.run::<RiggedResult>(JobRequest::Rig(request)).await
    }
}
