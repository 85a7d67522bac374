//! MCP tool definitions for Vidu.

use super::protocol::Tool;
use crate::error::{Result, ViduError};
use crate::generation::GenerationRequest;
use crate::vidu::TaskId;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const COST_WARNING: &str = "COST WARNING: This tool makes an API call to Vidu which may incur \
    costs. Only use when explicitly requested by the user.";

pub const TEXT_TO_VIDEO: &str = "generate_text_to_video";
pub const IMAGE_TO_VIDEO: &str = "generate_img_to_video";
pub const REFERENCE_TO_VIDEO: &str = "generate_reference2video_to_video";
pub const START_END_TO_VIDEO: &str = "generate_startend2video_to_video";
pub const TEMPLATE_TO_VIDEO: &str = "generate_template_to_video";
pub const QUERY_VIDEO: &str = "query_video";

/// A parsed `tools/call` request.
#[derive(Debug)]
pub enum ToolCall {
    Generate(GenerationRequest),
    Query(TaskId),
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| ViduError::InvalidInput(format!("Invalid arguments: {}", e)))
}

/// Parse tool arguments. Returns `None` for unknown tool names.
pub fn parse_tool_call(name: &str, args: Value) -> Option<Result<ToolCall>> {
    let call = match name {
        TEXT_TO_VIDEO => parse_args(args).map(GenerationRequest::TextToVideo),
        IMAGE_TO_VIDEO => parse_args(args).map(GenerationRequest::ImageToVideo),
        REFERENCE_TO_VIDEO => parse_args(args).map(GenerationRequest::ReferenceToVideo),
        START_END_TO_VIDEO => parse_args(args).map(GenerationRequest::StartEndToVideo),
        TEMPLATE_TO_VIDEO => parse_args(args).map(GenerationRequest::TemplateToVideo),
        QUERY_VIDEO => {
            return Some(match args.get("task_id") {
                Some(Value::String(s)) if !s.trim().is_empty() => Ok(ToolCall::Query(TaskId::parse(s))),
                Some(Value::Number(n)) if n.is_i64() => {
                    Ok(ToolCall::Query(TaskId::Number(n.as_i64().unwrap_or_default())))
                }
                _ => Err(ViduError::InvalidInput("task_id is required".to_string())),
            })
        }
        _ => return None,
    };
    Some(call.map(ToolCall::Generate))
}

fn movement_amplitude() -> Value {
    json!({
        "type": "string",
        "description": "The movement amplitude of objects in the frame",
        "enum": ["auto", "small", "medium", "large"],
        "default": "auto"
    })
}

fn bgm() -> Value {
    json!({
        "type": "boolean",
        "description": "Add suitable background music. Only supported when the generated video is 4 seconds long.",
        "default": false
    })
}

fn seed() -> Value {
    json!({
        "type": "integer",
        "description": "Random seed. 0 lets the service pick a random seed.",
        "default": 0
    })
}

fn prompt(required: bool) -> Value {
    let description = if required {
        "Textual description of the video, at most 1500 characters"
    } else {
        "Optional textual description of the video, at most 1500 characters"
    };
    json!({
        "type": "string",
        "description": description,
        "default": ""
    })
}

fn images(description: &str, min: usize, max: usize) -> Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "minItems": min,
        "maxItems": max,
        "description": format!(
            "{} Each entry is an image URL, a data URI, or a local file path.",
            description
        )
    })
}

fn description(summary: &str) -> String {
    format!("{}\n\n{}\n\nReturns the task_id and video_url.", summary, COST_WARNING)
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: TEXT_TO_VIDEO.to_string(),
            description: description("Generate a video from a text prompt."),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "Model: viduq1 (5s, 1080p) or vidu1.5 (4s 360p/720p/1080p, 8s 720p)",
                        "enum": ["viduq1", "vidu1.5"],
                        "default": "viduq1"
                    },
                    "prompt": prompt(true),
                    "style": {
                        "type": "string",
                        "description": "Style of the output video",
                        "enum": ["general", "anime"],
                        "default": "general"
                    },
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds (viduq1: 5, vidu1.5: 4 or 8)",
                        "default": 5
                    },
                    "seed": seed(),
                    "aspect_ratio": {
                        "type": "string",
                        "enum": ["16:9", "9:16", "1:1"],
                        "default": "16:9"
                    },
                    "resolution": {
                        "type": "string",
                        "description": "Output resolution; accepted values depend on model and duration",
                        "default": "1080p"
                    },
                    "movement_amplitude": movement_amplitude(),
                    "bgm": bgm()
                },
                "required": ["prompt"]
            }),
        },
        Tool {
            name: IMAGE_TO_VIDEO.to_string(),
            description: description("Generate a video that starts from the given image."),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "image": {
                        "type": "string",
                        "description": "Start frame: an image URL, a data URI, or a local file path"
                    },
                    "model": {
                        "type": "string",
                        "enum": ["viduq1", "vidu1.5", "vidu2.0"],
                        "default": "viduq1"
                    },
                    "prompt": prompt(false),
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds (viduq1: 5, vidu2.0/vidu1.5: 4 or 8)",
                        "default": 5
                    },
                    "seed": seed(),
                    "resolution": {
                        "type": "string",
                        "description": "Output resolution; accepted values depend on model and duration",
                        "default": "1080p"
                    },
                    "movement_amplitude": movement_amplitude(),
                    "bgm": bgm()
                },
                "required": ["image"]
            }),
        },
        Tool {
            name: REFERENCE_TO_VIDEO.to_string(),
            description: description(
                "Generate a video with subjects consistent with 1 to 3 reference images.",
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "images": images("Reference images of the subjects.", 1, 3),
                    "prompt": prompt(true),
                    "model": {
                        "type": "string",
                        "enum": ["vidu1.5", "vidu2.0"],
                        "default": "vidu2.0"
                    },
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds (vidu2.0: 4, vidu1.5: 4 or 8)",
                        "default": 4
                    },
                    "seed": seed(),
                    "aspect_ratio": {
                        "type": "string",
                        "enum": ["16:9", "9:16", "1:1"],
                        "default": "16:9"
                    },
                    "resolution": {
                        "type": "string",
                        "description": "Output resolution; accepted values depend on model and duration",
                        "default": "720p"
                    },
                    "movement_amplitude": movement_amplitude(),
                    "bgm": bgm()
                },
                "required": ["images", "prompt"]
            }),
        },
        Tool {
            name: START_END_TO_VIDEO.to_string(),
            description: description("Generate a video between a start frame and an end frame."),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "images": images("Two images: the start frame followed by the end frame.", 2, 2),
                    "model": {
                        "type": "string",
                        "enum": ["vidu1.5", "vidu2.0", "viduq1-classic", "viduq1"],
                        "default": "viduq1"
                    },
                    "prompt": prompt(false),
                    "duration": {
                        "type": "integer",
                        "description": "Video duration in seconds (viduq1/viduq1-classic: 5, vidu2.0/vidu1.5: 4 or 8)",
                        "default": 5
                    },
                    "seed": seed(),
                    "resolution": {
                        "type": "string",
                        "description": "Output resolution; accepted values depend on model and duration",
                        "default": "1080p"
                    },
                    "movement_amplitude": movement_amplitude(),
                    "bgm": bgm()
                },
                "required": ["images"]
            }),
        },
        Tool {
            name: TEMPLATE_TO_VIDEO.to_string(),
            description: description(
                "Generate a video from an AI video template. Different templates accept different parameters.",
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "template": {
                        "type": "string",
                        "description": "AI video template name, e.g. exotic_princess or beast_companion"
                    },
                    "images": images("Images used by the template.", 1, 3),
                    "prompt": prompt(false),
                    "seed": seed(),
                    "aspect_ratio": {
                        "type": "string",
                        "description": "Aspect ratio; accepted values vary by template",
                        "default": ""
                    },
                    "area": {
                        "type": "string",
                        "description": "Style control for the exotic_princess template only",
                        "enum": ["auto", "denmark", "uk", "africa", "china", "mexico", "switzerland",
                                 "russia", "italy", "korea", "thailand", "india", "japan"],
                        "default": "auto"
                    },
                    "beast": {
                        "type": "string",
                        "description": "Companion style for the beast_companion template only",
                        "enum": ["auto", "bear", "tiger", "elk", "snake", "lion", "wolf"],
                        "default": "auto"
                    },
                    "bgm": bgm()
                },
                "required": ["template", "images"]
            }),
        },
        Tool {
            name: QUERY_VIDEO.to_string(),
            description: "Wait for a previously submitted Vidu task and return its task_id and \
                video_url. Does not start a new generation."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": ["string", "integer"],
                        "description": "Task id returned by a generation call"
                    }
                },
                "required": ["task_id"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_object_schema() {
        let tools = get_tools();
        assert_eq!(tools.len(), 6);
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
        assert!(tools
            .iter()
            .filter(|t| t.name != QUERY_VIDEO)
            .all(|t| t.description.contains("COST WARNING")));
    }

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "generate_text_to_video",
                "generate_img_to_video",
                "generate_reference2video_to_video",
                "generate_startend2video_to_video",
                "generate_template_to_video",
                "query_video",
            ]
        );
    }

    #[test]
    fn test_parse_text_to_video_defaults() {
        let call = parse_tool_call(TEXT_TO_VIDEO, json!({"prompt": "a fox"}))
            .unwrap()
            .unwrap();
        match call {
            ToolCall::Generate(GenerationRequest::TextToVideo(r)) => {
                assert_eq!(r.prompt, "a fox");
                assert_eq!(r.model, "viduq1");
                assert_eq!(r.duration, 5);
                assert!(!r.bgm);
            }
            other => panic!("Expected TextToVideo, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_string_image() {
        let result = parse_tool_call(IMAGE_TO_VIDEO, json!({"image": 12})).unwrap();
        assert!(matches!(result, Err(ViduError::InvalidInput(_))));

        let result = parse_tool_call(REFERENCE_TO_VIDEO, json!({"images": ["ok", 3]})).unwrap();
        assert!(matches!(result, Err(ViduError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_query() {
        match parse_tool_call(QUERY_VIDEO, json!({"task_id": 123})).unwrap().unwrap() {
            ToolCall::Query(id) => assert_eq!(id, TaskId::Number(123)),
            other => panic!("Expected Query, got {:?}", other),
        }
        assert!(parse_tool_call(QUERY_VIDEO, json!({})).unwrap().is_err());
    }

    #[test]
    fn test_unknown_tool() {
        assert!(parse_tool_call("transcribe", json!({})).is_none());
    }
}
