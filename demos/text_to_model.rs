//! Generate a draft model from a prompt, refine it, and save both `.glb` files.
//!
//! Reads credentials from `COMFY_API_KEY` / `COMFY_AUTH_TOKEN`.
//!
//! ```sh
//! RUST_LOG=meshy_nodes=debug cargo run --example text_to_model -- "a red chair"
//! ```

use meshy_nodes::{
    ExecutionContext, MeshyConfig, MeshyNode, RefineInputs, RefineNode, TextToModelInputs,
    TextToModelNode,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a weathered wooden treasure chest".to_string());

    let config = MeshyConfig::from_env();
    if config.api_key.is_none() && config.auth_token.is_none() {
        eprintln!("Set COMFY_API_KEY or COMFY_AUTH_TOKEN first");
        return Ok(());
    }
    println!("Writing models to {}", config.output_dir.display());

    let ctx = ExecutionContext::from_config(config)
        .with_progress(|p| println!("[{}] {} {}%", p.task_id, p.status, p.progress));

    let draft = TextToModelNode::execute(&ctx, TextToModelInputs::new(prompt).with_random_seed())
        .await?;
    println!("Draft saved: {}", draft.path.display());

    let refined = RefineNode::execute(
        &ctx,
        RefineInputs::new(draft.task_id.clone()).enable_pbr(true),
    )
    .await?;
    println!("Refined saved: {}", refined.path.display());

    Ok(())
}
