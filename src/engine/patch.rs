use serde::{Deserialize, Serialize};

/// Geometry of the attached buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpec {
    pub frames: usize,
    #[serde(default = "default_channels")]
    pub channels: usize,
}

fn default_channels() -> usize {
    1
}

/// Persisted recorder configuration: the writer parameters plus, when a
/// buffer is attached, its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderPatch {
    #[serde(default)]
    pub channel: usize,
    #[serde(default = "default_interpolate")]
    pub interpolate: bool,
    #[serde(default)]
    pub overdub: f64,
    #[serde(default)]
    pub buffer: Option<BufferSpec>,
}

fn default_interpolate() -> bool {
    true
}

impl RecorderPatch {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid recorder patch: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }
}

impl Default for RecorderPatch {
    fn default() -> Self {
        Self {
            channel: 0,
            interpolate: true,
            overdub: 0.0,
            buffer: None,
        }
    }
}
