//! Video generation requests.
//!
//! Each generation mode validates its required fields, inlines any local
//! images, shapes the mode-specific payload, submits it, and waits for the
//! task to finish.

use crate::error::{Result, ViduError};
use crate::image::{normalize_image, normalize_images};
use crate::vidu::{Endpoint, GenerationResult, JobPoller, PollConfig, TaskId, ViduApi};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

/// Template whose payload carries the `area` field.
pub const TEMPLATE_EXOTIC_PRINCESS: &str = "exotic_princess";
/// Template whose payload carries the `beast` field.
pub const TEMPLATE_BEAST_COMPANION: &str = "beast_companion";

/// Text-to-video parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextToVideo {
    pub model: String,
    pub prompt: String,
    pub style: String,
    pub duration: u32,
    pub seed: i64,
    pub aspect_ratio: String,
    pub resolution: String,
    pub movement_amplitude: String,
    pub bgm: bool,
}

impl Default for TextToVideo {
    fn default() -> Self {
        Self {
            model: "viduq1".to_string(),
            prompt: String::new(),
            style: "general".to_string(),
            duration: 5,
            seed: 0,
            aspect_ratio: "16:9".to_string(),
            resolution: "1080p".to_string(),
            movement_amplitude: "auto".to_string(),
            bgm: false,
        }
    }
}

/// Image-to-video parameters. The image becomes the first frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageToVideo {
    pub image: String,
    pub model: String,
    pub prompt: String,
    pub duration: u32,
    pub seed: i64,
    pub resolution: String,
    pub movement_amplitude: String,
    pub bgm: bool,
}

impl Default for ImageToVideo {
    fn default() -> Self {
        Self {
            image: String::new(),
            model: "viduq1".to_string(),
            prompt: String::new(),
            duration: 5,
            seed: 0,
            resolution: "1080p".to_string(),
            movement_amplitude: "auto".to_string(),
            bgm: false,
        }
    }
}

/// Multi-reference parameters: 1 to 3 subject images plus a prompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceToVideo {
    pub images: Vec<String>,
    pub prompt: String,
    pub model: String,
    pub duration: u32,
    pub seed: i64,
    pub aspect_ratio: String,
    pub resolution: String,
    pub movement_amplitude: String,
    pub bgm: bool,
}

impl Default for ReferenceToVideo {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            prompt: String::new(),
            model: "vidu2.0".to_string(),
            duration: 4,
            seed: 0,
            aspect_ratio: "16:9".to_string(),
            resolution: "720p".to_string(),
            movement_amplitude: "auto".to_string(),
            bgm: false,
        }
    }
}

/// Start/end frame parameters: first image is the start frame, second the end.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StartEndToVideo {
    pub images: Vec<String>,
    pub model: String,
    pub prompt: String,
    pub duration: u32,
    pub seed: i64,
    pub resolution: String,
    pub movement_amplitude: String,
    pub bgm: bool,
}

impl Default for StartEndToVideo {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            model: "viduq1".to_string(),
            prompt: String::new(),
            duration: 5,
            seed: 0,
            resolution: "1080p".to_string(),
            movement_amplitude: "auto".to_string(),
            bgm: false,
        }
    }
}

/// Template parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateToVideo {
    pub template: String,
    pub images: Vec<String>,
    pub prompt: String,
    pub seed: i64,
    pub aspect_ratio: String,
    pub area: String,
    pub beast: String,
    pub bgm: bool,
}

impl Default for TemplateToVideo {
    fn default() -> Self {
        Self {
            template: String::new(),
            images: Vec::new(),
            prompt: String::new(),
            seed: 0,
            aspect_ratio: String::new(),
            area: "auto".to_string(),
            beast: "auto".to_string(),
            bgm: false,
        }
    }
}

/// A generation request in one of the supported modes.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    TextToVideo(TextToVideo),
    ImageToVideo(ImageToVideo),
    ReferenceToVideo(ReferenceToVideo),
    StartEndToVideo(StartEndToVideo),
    TemplateToVideo(TemplateToVideo),
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ViduError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_images(images: &[String]) -> Result<()> {
    if images.is_empty() {
        return Err(ViduError::InvalidInput("images is required".to_string()));
    }
    Ok(())
}

impl GenerationRequest {
    /// Endpoint the request is submitted to.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            GenerationRequest::TextToVideo(_) => Endpoint::TextToVideo,
            GenerationRequest::ImageToVideo(_) => Endpoint::ImageToVideo,
            GenerationRequest::ReferenceToVideo(_) => Endpoint::ReferenceToVideo,
            GenerationRequest::StartEndToVideo(_) => Endpoint::StartEndToVideo,
            GenerationRequest::TemplateToVideo(_) => Endpoint::TemplateToVideo,
        }
    }

    /// Check that the mode's required fields are present.
    pub fn validate(&self) -> Result<()> {
        match self {
            GenerationRequest::TextToVideo(r) => require(&r.prompt, "prompt"),
            GenerationRequest::ImageToVideo(r) => require(&r.image, "image"),
            GenerationRequest::ReferenceToVideo(r) => {
                require_images(&r.images)?;
                require(&r.prompt, "prompt")
            }
            GenerationRequest::StartEndToVideo(r) => require_images(&r.images),
            GenerationRequest::TemplateToVideo(r) => {
                require(&r.template, "template")?;
                require_images(&r.images)
            }
        }
    }

    /// Build the JSON body, inlining local images along the way.
    pub async fn payload(&self) -> Result<Value> {
        let payload = match self {
            GenerationRequest::TextToVideo(r) => json!({
                "model": r.model,
                "style": r.style,
                "prompt": r.prompt,
                "duration": r.duration,
                "seed": r.seed,
                "aspect_ratio": r.aspect_ratio,
                "resolution": r.resolution,
                "movement_amplitude": r.movement_amplitude,
                "bgm": r.bgm,
            }),
            GenerationRequest::ImageToVideo(r) => json!({
                "model": r.model,
                "images": [normalize_image(&r.image).await?],
                "prompt": r.prompt,
                "duration": r.duration,
                "seed": r.seed,
                "resolution": r.resolution,
                "movement_amplitude": r.movement_amplitude,
                "bgm": r.bgm,
            }),
            GenerationRequest::ReferenceToVideo(r) => json!({
                "model": r.model,
                "images": normalize_images(&r.images).await?,
                "prompt": r.prompt,
                "duration": r.duration,
                "seed": r.seed,
                "aspect_ratio": r.aspect_ratio,
                "resolution": r.resolution,
                "movement_amplitude": r.movement_amplitude,
                "bgm": r.bgm,
            }),
            GenerationRequest::StartEndToVideo(r) => json!({
                "model": r.model,
                "images": normalize_images(&r.images).await?,
                "prompt": r.prompt,
                "duration": r.duration,
                "seed": r.seed,
                "resolution": r.resolution,
                "movement_amplitude": r.movement_amplitude,
                "bgm": r.bgm,
            }),
            GenerationRequest::TemplateToVideo(r) => {
                let mut payload = json!({
                    "template": r.template,
                    "images": normalize_images(&r.images).await?,
                    "prompt": r.prompt,
                    "seed": r.seed,
                    "aspect_ratio": r.aspect_ratio,
                    "bgm": r.bgm,
                });
                if r.template == TEMPLATE_EXOTIC_PRINCESS {
                    payload["area"] = json!(r.area);
                }
                if r.template == TEMPLATE_BEAST_COMPANION {
                    payload["beast"] = json!(r.beast);
                }
                payload
            }
        };

        Ok(payload)
    }
}

/// Validate, submit and wait for a generation request.
#[instrument(skip(api, config, request), fields(endpoint = %request.endpoint()))]
pub async fn generate(
    api: &dyn ViduApi,
    config: &PollConfig,
    request: &GenerationRequest,
) -> Result<GenerationResult> {
    request.validate()?;
    let payload = request.payload().await?;

    let task_id = api.submit(request.endpoint(), &payload).await?;
    info!("Submitted {} task {}", request.endpoint(), task_id);

    JobPoller::new(api, config.clone()).wait(task_id).await
}

/// Wait for an already submitted task.
pub async fn query(api: &dyn ViduApi, config: &PollConfig, task_id: TaskId) -> Result<GenerationResult> {
    JobPoller::new(api, config.clone()).wait(task_id).await
}

/// Render an outcome as the string returned to the tool host.
pub fn render(outcome: Result<GenerationResult>) -> String {
    match outcome.and_then(|result| result.to_json_pretty()) {
        Ok(json) => json,
        Err(err) => {
            error!("Video generation error: {}", err);
            err.to_tool_output()
        }
    }
}
