//! Lesson Model

use serde::{Deserialize, Serialize};

/// Where the lesson video is hosted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    /// Bilibili
    Bili,
    /// Qiniu Cloud
    Qiniu,
    /// Local storage
    #[default]
    Local,
}

impl VideoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bili => "bili",
            Self::Qiniu => "qiniu",
            Self::Local => "local",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bili" => Some(Self::Bili),
            "qiniu" => Some(Self::Qiniu),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

/// Lesson entity — belongs to exactly one course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    /// Free-preview lessons are accessible without entitlement
    pub free_preview: bool,
    pub video_source: VideoSource,
    pub video_url: Option<String>,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_source_roundtrip() {
        for source in [VideoSource::Bili, VideoSource::Qiniu, VideoSource::Local] {
            assert_eq!(VideoSource::parse(source.as_str()), Some(source));
        }
        assert_eq!(VideoSource::parse("youtube"), None);
    }

    #[test]
    fn test_video_source_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&VideoSource::Qiniu).unwrap(),
            "\"qiniu\""
        );
        let parsed: VideoSource = serde_json::from_str("\"bili\"").unwrap();
        assert_eq!(parsed, VideoSource::Bili);
    }
}
