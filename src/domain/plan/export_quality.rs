//! Export resolutions a mockup can be downloaded at.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Requested export resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportQuality {
    /// Standard definition, available on every tier.
    #[default]
    #[serde(rename = "720p")]
    Sd720,

    /// Full HD, gated by `allow_hd_export`.
    #[serde(rename = "1080p")]
    Hd1080,

    /// Ultra HD, gated by `allow_4k_export`.
    #[serde(rename = "4K", alias = "4k")]
    Uhd4k,
}

impl ExportQuality {
    pub fn requires_hd(&self) -> bool {
        matches!(self, ExportQuality::Hd1080)
    }

    pub fn requires_4k(&self) -> bool {
        matches!(self, ExportQuality::Uhd4k)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportQuality::Sd720 => "720p",
            ExportQuality::Hd1080 => "1080p",
            ExportQuality::Uhd4k => "4K",
        }
    }
}

impl std::fmt::Display for ExportQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ExportQuality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "720p" => Ok(ExportQuality::Sd720),
            "1080p" => Ok(ExportQuality::Hd1080),
            "4K" | "4k" => Ok(ExportQuality::Uhd4k),
            other => Err(ValidationError::invalid_format(
                "quality",
                format!("unsupported export quality '{}'", other),
            )),
        }
    }
}
