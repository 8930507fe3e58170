use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_PRESET: &str = "slow";
pub const DEFAULT_CRF: f64 = 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// 10-bit HEVC (libx265, main10).
    #[default]
    Hevc10,
    /// 8-bit H.264 (libx264).
    H264,
}

impl Codec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Hevc10 => "hevc10",
            Codec::H264 => "h264",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /encode` after coercion. Every field has a default, so any
/// JSON value (or none at all) yields a usable request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeRequest {
    pub fps: u32,
    /// Minimum number of frames that must be present; 0 skips the check.
    pub total_frames: u64,
    pub cleanup: bool,
    pub codec: Codec,
    pub preset: String,
    pub crf: f64,
}

impl Default for EncodeRequest {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            total_frames: 0,
            cleanup: false,
            codec: Codec::default(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
        }
    }
}

impl EncodeRequest {
    /// Malformed JSON falls back to an empty object, i.e. all defaults.
    pub fn lenient(body: &[u8]) -> Self {
        let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    /// Like [`EncodeRequest::lenient`], but a non-empty body must be a JSON object.
    pub fn strict(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value = serde_json::from_slice::<Value>(body)?;
        if !value.is_object() {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "encode body must be a JSON object",
            ));
        }
        Ok(Self::from_value(&value))
    }

    pub fn from_value(body: &Value) -> Self {
        let fps = number(body.get("fps"))
            .map(|n| n.floor().max(1.0) as u32)
            .unwrap_or(DEFAULT_FPS);
        let total_frames = number(body.get("totalFrames"))
            .map(|n| n.floor().max(0.0) as u64)
            .unwrap_or(0);
        let crf = number(body.get("crf"))
            .map(|n| n.max(0.0))
            .unwrap_or(DEFAULT_CRF);
        let codec = match body.get("codec") {
            Some(Value::String(s)) if s == "h264" => Codec::H264,
            _ => Codec::Hevc10,
        };
        let preset = match body.get("preset") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => DEFAULT_PRESET.to_string(),
        };

        Self {
            fps,
            total_frames,
            cleanup: truthy(body.get("cleanup")),
            codec,
            preset,
            crf,
        }
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
