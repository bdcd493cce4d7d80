//! Placement templates a product image can be composited into.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::paywall::PaywallError;

/// One advertising placement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdFormat {
    pub id: String,
    pub name: String,
    /// Instruction sent to the image generator alongside the upload.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub popular: bool,
}

impl AdFormat {
    fn builtin(id: &str, name: &str, prompt: &str, dimensions: &str, popular: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            prompt: prompt.to_string(),
            dimensions: Some(dimensions.to_string()),
            popular,
        }
    }
}

static DEFAULT_FORMATS: Lazy<Vec<AdFormat>> = Lazy::new(|| {
    vec![
        AdFormat::builtin(
            "billboard-nyc",
            "Times Square Billboard",
            "Place this product on a huge billboard in Times Square at night, surrounded by bright lights and crowds",
            "1920x1080",
            true,
        ),
        AdFormat::builtin(
            "magazine-luxury",
            "Luxury Magazine Spread",
            "Show this product as a full-page ad in a glossy luxury magazine lying open on a marble table",
            "2100x2800",
            false,
        ),
        AdFormat::builtin(
            "bus-stop",
            "Bus Stop Ad",
            "Show this product as a backlit advertisement at a modern city bus stop with people waiting",
            "1200x1800",
            false,
        ),
        AdFormat::builtin(
            "cafe-table",
            "Cafe Table Tent",
            "Place this product on a table tent card in a cozy cafe with coffee cups nearby",
            "800x1200",
            false,
        ),
        AdFormat::builtin(
            "subway-car",
            "Subway Car Panel",
            "Display this product on an overhead advertising panel inside a busy subway car",
            "1920x600",
            false,
        ),
        AdFormat::builtin(
            "newspaper-vintage",
            "Vintage Newspaper",
            "Print this product as a classic black and white advertisement in a vintage newspaper",
            "1600x2400",
            false,
        ),
        AdFormat::builtin(
            "social-media-story",
            "Social Media Story",
            "Show this product in a social media story on a phone held by someone in a trendy coffee shop",
            "1080x1920",
            true,
        ),
        AdFormat::builtin(
            "music-festival",
            "Festival Banner",
            "Display this product on a large banner at an outdoor music festival with crowds and stage lights",
            "2400x800",
            true,
        ),
        AdFormat::builtin(
            "art-gallery",
            "Art Gallery Print",
            "Hang this product as a framed print on a white wall in a modern art gallery with visitors",
            "2000x2000",
            false,
        ),
        AdFormat::builtin(
            "inflight-magazine",
            "Inflight Magazine",
            "Show this product as an ad in an inflight magazine resting on an airplane tray table",
            "2100x2800",
            false,
        ),
    ]
});

/// Ordered collection of placement templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementCatalog {
    formats: Vec<AdFormat>,
}

impl PlacementCatalog {
    pub fn new(formats: Vec<AdFormat>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[AdFormat] {
        &self.formats
    }

    pub fn get(&self, id: &str) -> Option<&AdFormat> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// Look up a format, failing with an input error for unknown ids.
    pub fn require(&self, id: &str) -> Result<&AdFormat, PaywallError> {
        self.get(id)
            .ok_or_else(|| PaywallError::unknown_placement(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

impl Default for PlacementCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATS.clone())
    }
}
