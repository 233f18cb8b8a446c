//! Enumerated vocabularies shared with the remote API.
//!
//! Wire strings are the API's own: snake_case for labels and pipeline
//! stages, two-letter codes for confusion-matrix categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value outside an enumerated vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Training label assigned to a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    WouldWatch,
    WouldNotWatch,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WouldWatch => "would_watch",
            Self::WouldNotWatch => "would_not_watch",
        }
    }
}

impl FromStr for Label {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "would_watch" => Ok(Self::WouldWatch),
            "would_not_watch" => Ok(Self::WouldNotWatch),
            other => Err(UnknownVariant::new("label", other)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a media item in the remote ingestion/processing workflow.
///
/// The stages form the server's pipeline order; this client never
/// enforces transitions, it only names the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Ingested,
    Paused,
    Parsed,
    Rejected,
    FileAccepted,
    MetadataCollected,
    MediaAccepted,
    Downloading,
    Downloaded,
    Transferred,
    Complete,
}

impl PipelineStatus {
    /// All stages, in pipeline order.
    pub const ALL: [PipelineStatus; 11] = [
        Self::Ingested,
        Self::Paused,
        Self::Parsed,
        Self::Rejected,
        Self::FileAccepted,
        Self::MetadataCollected,
        Self::MediaAccepted,
        Self::Downloading,
        Self::Downloaded,
        Self::Transferred,
        Self::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingested => "ingested",
            Self::Paused => "paused",
            Self::Parsed => "parsed",
            Self::Rejected => "rejected",
            Self::FileAccepted => "file_accepted",
            Self::MetadataCollected => "metadata_collected",
            Self::MediaAccepted => "media_accepted",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Transferred => "transferred",
            Self::Complete => "complete",
        }
    }
}

impl FromStr for PipelineStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("pipeline status", s))
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the server-side rejection filter for a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStatus {
    Unfiltered,
    Accepted,
    Rejected,
    Override,
}

impl RejectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unfiltered => "unfiltered",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Override => "override",
        }
    }
}

impl FromStr for RejectionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unfiltered" => Ok(Self::Unfiltered),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "override" => Ok(Self::Override),
            other => Err(UnknownVariant::new("rejection status", other)),
        }
    }
}

impl fmt::Display for RejectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confusion-matrix category of a prediction relative to its actual label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmValue {
    Tp,
    Tn,
    Fp,
    Fn,
}

impl CmValue {
    pub const ALL: [CmValue; 4] = [Self::Tp, Self::Tn, Self::Fp, Self::Fn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tp => "tp",
            Self::Tn => "tn",
            Self::Fp => "fp",
            Self::Fn => "fn",
        }
    }

    /// Long-form description for display.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Tp => "true positive",
            Self::Tn => "true negative",
            Self::Fp => "false positive",
            Self::Fn => "false negative",
        }
    }
}

impl FromStr for CmValue {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tp" => Ok(Self::Tp),
            "tn" => Ok(Self::Tn),
            "fp" => Ok(Self::Fp),
            "fn" => Ok(Self::Fn),
            other => Err(UnknownVariant::new("confusion-matrix value", other)),
        }
    }
}

impl fmt::Display for CmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownVariant::new("sort order", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_wire_strings() {
        assert_eq!(Label::WouldWatch.as_str(), "would_watch");
        assert_eq!("would_not_watch".parse(), Ok(Label::WouldNotWatch));
        assert!("maybe_watch".parse::<Label>().is_err());
    }

    #[test]
    fn label_serde_roundtrip() {
        let json = serde_json::to_string(&Label::WouldWatch).unwrap();
        assert_eq!(json, r#""would_watch""#);
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Label::WouldWatch);
    }

    #[test]
    fn pipeline_status_covers_all_stages() {
        for status in PipelineStatus::ALL {
            assert_eq!(status.as_str().parse(), Ok(status));
        }
        assert!("unknown_stage".parse::<PipelineStatus>().is_err());
    }

    #[test]
    fn pipeline_status_serde_matches_wire() {
        let json = serde_json::to_string(&PipelineStatus::MetadataCollected).unwrap();
        assert_eq!(json, r#""metadata_collected""#);
    }

    #[test]
    fn rejection_status_roundtrip() {
        for s in ["unfiltered", "accepted", "rejected", "override"] {
            let parsed: RejectionStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn cm_value_roundtrip() {
        for cm in CmValue::ALL {
            assert_eq!(cm.as_str().parse(), Ok(cm));
        }
        assert!("xx".parse::<CmValue>().is_err());
    }

    #[test]
    fn cm_value_serde_is_lowercase() {
        let json = serde_json::to_string(&CmValue::Fn).unwrap();
        assert_eq!(json, r#""fn""#);
    }

    #[test]
    fn sort_order_default_is_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!("asc".parse(), Ok(SortOrder::Asc));
    }
}
