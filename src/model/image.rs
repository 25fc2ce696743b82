//! Image record: the owner of regions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ImageId, Region};

/// Background music attached to a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Asset path or URL of the audio file
    pub path: String,
    /// Original filename, for the player title
    #[serde(default)]
    pub name: String,
}

impl AudioTrack {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Player title: the filename without extension, underscores as spaces.
    pub fn title(&self) -> String {
        let base = if self.name.is_empty() {
            self.path.rsplit('/').next().unwrap_or_default()
        } else {
            self.name.as_str()
        };
        let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
        stem.replace('_', " ")
    }
}

/// An uploaded image with its regions, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Filled from the database key when absent
    #[serde(default)]
    pub id: ImageId,
    /// Filename as uploaded
    #[serde(default)]
    pub original_name: String,
    /// Asset path the renderer loads
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub uploaded_at: DateTime<Utc>,
    /// Natural size (width, height) in pixels, if known
    #[serde(default)]
    pub dimensions: Option<(u32, u32)>,
    #[serde(default)]
    pub audio: Option<AudioTrack>,
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Fields this crate does not model (e.g. the upload server's
    /// `filename`, `size`, `mimetype`), written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Image {
    /// Create an empty image record.
    pub fn new(id: impl Into<ImageId>, original_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            path: String::new(),
            description: String::new(),
            uploaded_at: Utc::now(),
            dimensions: None,
            audio: None,
            regions: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Set the asset path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the natural image size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Attach a soundtrack.
    pub fn with_audio(mut self, audio: AudioTrack) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Look up a region by id.
    pub fn region(&self, region_id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == region_id)
    }

    /// Name shown in galleries and prompts.
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            &self.id
        } else {
            &self.original_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_title() {
        assert_eq!(
            AudioTrack::new("/uploads/x.mp3", "rainy_night.mp3").title(),
            "rainy night"
        );
        assert_eq!(AudioTrack::new("/uploads/calm_sea.ogg", "").title(), "calm sea");
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let json = r#"{
            "id": "img1",
            "originalName": "beach.png",
            "filename": "1700000000000-beach.png",
            "size": 48213,
            "mimetype": "image/png"
        }"#;
        let image: Image = serde_json::from_str(json).unwrap();
        assert_eq!(image.original_name, "beach.png");
        assert_eq!(image.extra["filename"], "1700000000000-beach.png");
        assert!(!image.extra.contains_key("originalName"));

        let written = serde_json::to_value(&image).unwrap();
        assert_eq!(written["size"], 48213);
        assert_eq!(written["mimetype"], "image/png");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(Image::new("img1", "").display_name(), "img1");
        assert_eq!(Image::new("img1", "beach.png").display_name(), "beach.png");
    }
}
