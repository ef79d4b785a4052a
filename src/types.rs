use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

// ── Enumerations ────────────────────────────────────────────────────

/// Meshy model generation. Only `latest` is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    #[default]
    Latest,
}

impl AiModel {
    pub const ALL: [AiModel; 1] = [AiModel::Latest];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiModel::Latest => "latest",
        }
    }
}

/// Art style for text-to-model generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    #[default]
    Realistic,
    Sculpture,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 2] = [ArtStyle::Realistic, ArtStyle::Sculpture];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::Realistic => "realistic",
            ArtStyle::Sculpture => "sculpture",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Mesh topology used when remeshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Triangle,
    Quad,
}

impl Topology {
    pub const ALL: [Topology; 2] = [Topology::Triangle, Topology::Quad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Triangle => "triangle",
            Topology::Quad => "quad",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymmetryMode {
    #[default]
    Auto,
    On,
    Off,
}

impl SymmetryMode {
    pub const ALL: [SymmetryMode; 3] = [SymmetryMode::Auto, SymmetryMode::On, SymmetryMode::Off];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymmetryMode::Auto => "auto",
            SymmetryMode::On => "on",
            SymmetryMode::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Pose the generated character should be placed in.
///
/// The UI shows `""`, `"A-pose"` and `"T-pose"`; the API expects the
/// lowercased label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoseMode {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "a-pose")]
    APose,
    #[serde(rename = "t-pose")]
    TPose,
}

impl PoseMode {
    pub const ALL: [PoseMode; 3] = [PoseMode::None, PoseMode::APose, PoseMode::TPose];

    /// Label shown in the node UI.
    pub fn label(&self) -> &'static str {
        match self {
            PoseMode::None => "",
            PoseMode::APose => "A-pose",
            PoseMode::TPose => "T-pose",
        }
    }

    /// Parse a UI label or wire token, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.label().to_lowercase() == lower)
    }
}

/// Task status tokens reported by the status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether polling should stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Endpoints ───────────────────────────────────────────────────────

/// Which Meshy task family a request belongs to. Determines the creation
/// path and the status path (`<path>/<task id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    TextTo3d,
    ImageTo3d,
    MultiImageTo3d,
    Rigging,
    Animation,
    Retexture,
}

impl TaskKind {
    pub fn path(&self) -> &'static str {
        match self {
            TaskKind::TextTo3d => "/proxy/meshy/openapi/v2/text-to-3d",
            TaskKind::ImageTo3d => "/proxy/meshy/openapi/v1/image-to-3d",
            TaskKind::MultiImageTo3d => "/proxy/meshy/openapi/v1/multi-image-to-3d",
            TaskKind::Rigging => "/proxy/meshy/openapi/v1/rigging",
            TaskKind::Animation => "/proxy/meshy/openapi/v1/animations",
            TaskKind::Retexture => "/proxy/meshy/openapi/v1/retexture",
        }
    }

    pub fn status_path(&self, task_id: &str) -> String {
        format!("{}/{}", self.path(), task_id)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.path().rsplit('/').next().unwrap_or_default();
        f.write_str(name)
    }
}

// ── Toggles ─────────────────────────────────────────────────────────

/// Remesh settings. `topology` and `target_polycount` exist only when
/// remeshing is enabled and are left out of the request otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Remesh {
    Enabled {
        topology: Topology,
        target_polycount: u32,
    },
    Disabled,
}

impl Default for Remesh {
    fn default() -> Self {
        Remesh::Enabled {
            topology: Topology::Triangle,
            target_polycount: 300_000,
        }
    }
}

impl Serialize for Remesh {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Remesh::Enabled {
                topology,
                target_polycount,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("should_remesh", &true)?;
                map.serialize_entry("topology", topology)?;
                map.serialize_entry("target_polycount", target_polycount)?;
                map.end()
            }
            Remesh::Disabled => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("should_remesh", &false)?;
                map.end()
            }
        }
    }
}

/// What guides texturing: nothing, a text prompt, or an uploaded image.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextureGuidance {
    #[default]
    None,
    Prompt(String),
    ImageUrl(String),
}

impl Serialize for TextureGuidance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TextureGuidance::None => serializer.serialize_map(Some(0))?.end(),
            TextureGuidance::Prompt(prompt) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("texture_prompt", prompt)?;
                map.end()
            }
            TextureGuidance::ImageUrl(url) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("texture_image_url", url)?;
                map.end()
            }
        }
    }
}

/// Texture settings for image-to-model generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Texturing {
    Enabled {
        enable_pbr: bool,
        guidance: TextureGuidance,
    },
    Disabled,
}

impl Default for Texturing {
    fn default() -> Self {
        Texturing::Enabled {
            enable_pbr: false,
            guidance: TextureGuidance::None,
        }
    }
}

impl Serialize for Texturing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Texturing::Enabled {
                enable_pbr,
                guidance,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("should_texture", &true)?;
                map.serialize_entry("enable_pbr", enable_pbr)?;
                match guidance {
                    TextureGuidance::None => {}
                    TextureGuidance::Prompt(prompt) => {
                        map.serialize_entry("texture_prompt", prompt)?
                    }
                    TextureGuidance::ImageUrl(url) => {
                        map.serialize_entry("texture_image_url", url)?
                    }
                }
                map.end()
            }
            Texturing::Disabled => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("should_texture", &false)?;
                map.end()
            }
        }
    }
}

/// Style source for retexturing. Exactly one is always present.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleGuidance {
    Text(String),
    ImageUrl(String),
}

impl Serialize for StyleGuidance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            StyleGuidance::Text(prompt) => map.serialize_entry("text_style_prompt", prompt)?,
            StyleGuidance::ImageUrl(url) => map.serialize_entry("image_style_url", url)?,
        }
        map.end()
    }
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToModelRequest {
    pub mode: &'static str,
    pub prompt: String,
    pub art_style: ArtStyle,
    pub ai_model: AiModel,
    #[serde(flatten)]
    pub remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    pub pose_mode: PoseMode,
    pub seed: u32,
    pub moderation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineRequest {
    pub mode: &'static str,
    pub preview_task_id: String,
    pub enable_pbr: bool,
    #[serde(flatten)]
    pub guidance: TextureGuidance,
    pub ai_model: AiModel,
    pub moderation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageToModelRequest {
    pub image_url: String,
    pub ai_model: AiModel,
    #[serde(flatten)]
    pub remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    #[serde(flatten)]
    pub texturing: Texturing,
    pub pose_mode: PoseMode,
    pub seed: u32,
    pub moderation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiImageToModelRequest {
    pub image_urls: Vec<String>,
    pub ai_model: AiModel,
    #[serde(flatten)]
    pub remesh: Remesh,
    pub symmetry_mode: SymmetryMode,
    #[serde(flatten)]
    pub texturing: Texturing,
    pub pose_mode: PoseMode,
    pub seed: u32,
    pub moderation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiggingRequest {
    pub input_task_id: String,
    pub height_meters: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationRequest {
    pub rig_task_id: String,
    pub action_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetextureRequest {
    pub input_task_id: String,
    pub ai_model: AiModel,
    pub enable_original_uv: bool,
    pub enable_pbr: bool,
    #[serde(flatten)]
    pub style: StyleGuidance,
}

/// Any Meshy creation request, tagged by operation kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobRequest {
    TextToModel(TextToModelRequest),
    Refine(RefineRequest),
    ImageToModel(ImageToModelRequest),
    MultiImageToModel(MultiImageToModelRequest),
    Rig(RiggingRequest),
    Animate(AnimationRequest),
    Retexture(RetextureRequest),
}

impl JobRequest {
    /// The endpoint family this request is submitted to.
    pub fn kind(&self) -> TaskKind {
        match self {
            JobRequest::TextToModel(_) | JobRequest::Refine(_) => TaskKind::TextTo3d,
            JobRequest::ImageToModel(_) => TaskKind::ImageTo3d,
            JobRequest::MultiImageToModel(_) => TaskKind::MultiImageTo3d,
            JobRequest::Rig(_) => TaskKind::Rigging,
            JobRequest::Animate(_) => TaskKind::Animation,
            JobRequest::Retexture(_) => TaskKind::Retexture,
        }
    }

    /// Serialize to the JSON body sent to the creation endpoint.
    pub fn to_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// ── Responses ───────────────────────────────────────────────────────

/// Body returned by every creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub result: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelUrls {
    #[serde(default)]
    pub glb: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiggedModelUrls {
    #[serde(default)]
    pub rigged_character_glb_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimatedModelUrls {
    #[serde(default)]
    pub animation_glb_url: String,
}

/// One set of texture maps produced alongside a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureUrls {
    pub base_color: String,
    #[serde(default)]
    pub metallic: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub roughness: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Status snapshot of a model-producing task (text, image, multi-image,
/// refine and retexture all share this shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    pub id: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub model_urls: ModelUrls,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub texture_urls: Option<Vec<TextureUrls>>,
    #[serde(default)]
    pub task_error: Option<TaskError>,
}

impl ModelResult {
    /// Texture maps, treating `null` and absent as empty.
    pub fn textures(&self) -> &[TextureUrls] {
        self.texture_urls.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiggedResult {
    pub id: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub result: RiggedModelUrls,
    #[serde(default)]
    pub task_error: Option<TaskError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationResult {
    pub id: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub result: AnimatedModelUrls,
    #[serde(default)]
    pub task_error: Option<TaskError>,
}

// ── Images ──────────────────────────────────────────────────────────

/// An encoded image handed to a node by the host, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

impl ImageInput {
    /// Wrap PNG-encoded bytes.
    pub fn png(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: "image/png".to_string(),
            file_name: "image.png".to_string(),
        }
    }

    /// Set the file name reported to the upload service.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }
}
