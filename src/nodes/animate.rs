use async_trait::async_trait;

use super::{ExecutionContext, MeshyNode, NodeOutput};
use crate::error::{Result, ValidationError};
use crate::schema::{InputSpec, NodeSchema, OutputSpec, PriceBadge, MESHY_RIGGED_TASK_ID};
use crate::types::{AnimationRequest, AnimationResult, JobRequest};
use crate::validation::{self, ACTION_ID_RANGE};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimateInputs {
    pub rig_task_id: String,
    /// Entry of Meshy's animation library.
    pub action_id: u32,
}

impl AnimateInputs {
    pub fn new(rig_task_id: impl Into<String>, action_id: u32) -> Self {
        Self {
            rig_task_id: rig_task_id.into(),
            action_id,
        }
    }
}

pub fn build_request(inputs: &AnimateInputs) -> std::result::Result<AnimationRequest, ValidationError> {
    if inputs.rig_task_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "rig_task_id",
        });
    }
    let action_id = validation::check_range("action_id", inputs.action_id, &ACTION_ID_RANGE)?;
    Ok(AnimationRequest {
        rig_task_id: inputs.rig_task_id.clone(),
        action_id,
    })
}

/// `Meshy: Animate Model`: applies an animation to a rigged character.
pub struct AnimateModelNode;

#[async_trait]
impl MeshyNode for AnimateModelNode {
    type Inputs = AnimateInputs;

    fn schema() -> NodeSchema {
        NodeSchema::api_node(
            "MeshyAnimateModelNode",
            "Meshy: Animate Model",
            PriceBadge::fixed(0.12),
        )
        .description("Apply a specific animation action to a previously rigged character.")
        .inputs(vec![
            InputSpec::custom("rig_task_id", MESHY_RIGGED_TASK_ID),
            InputSpec::int(
                "action_id",
                *ACTION_ID_RANGE.start() as i64,
                *ACTION_ID_RANGE.end() as i64,
                0,
            )
            .tooltip(
                "Visit https://docs.meshy.ai/en/api/animation-library for a list of available values.",
            ),
        ])
        .outputs(vec![OutputSpec::string("model_file")])
    }

    async fn execute(ctx: &ExecutionContext, inputs: AnimateInputs) -> Result<NodeOutput> {
        let request = build_request(&inputs)?;
        ctx.run::<AnimationResult>(JobRequest::Animate(request))
            .await
    }
}
