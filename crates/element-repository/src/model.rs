use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use selfheal_core_types::BoundingBox;

/// Recovery bundle stored for one originally-successful locator.
///
/// Bundles are never mutated after they are stored; a re-capture replaces the
/// whole value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedElement {
    pub original_locator: String,
    /// Candidate replacements, most specific first.
    pub alternative_locators: Vec<String>,
    /// PNG of the element's box at capture time.
    #[serde(default, with = "image_bytes")]
    pub snapshot_image: Option<Vec<u8>>,
    pub bounding_box: Option<BoundingBox>,
    pub nearby_text: String,
    pub captured_at: DateTime<Utc>,
}

impl CapturedElement {
    pub fn new(original_locator: impl Into<String>) -> Self {
        Self {
            original_locator: original_locator.into(),
            alternative_locators: Vec::new(),
            snapshot_image: None,
            bounding_box: None,
            nearby_text: String::new(),
            captured_at: Utc::now(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternative_locators = alternatives;
        self
    }

    pub fn with_nearby_text(mut self, text: impl Into<String>) -> Self {
        self.nearby_text = text.into();
        self
    }

    pub fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn with_snapshot_image(mut self, image: Vec<u8>) -> Self {
        self.snapshot_image = Some(image);
        self
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// The most specific alternative, if any was derived.
    pub fn primary_alternative(&self) -> Option<&str> {
        self.alternative_locators.first().map(String::as_str)
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        match (&self.snapshot_image, self.bounding_box) {
            (Some(image), Some(bounding_box)) if !image.is_empty() => Some(Snapshot {
                image: image.clone(),
                bounding_box,
                captured_at: self.captured_at,
            }),
            _ => None,
        }
    }
}

/// Visual half of a bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub image: Vec<u8>,
    pub bounding_box: BoundingBox,
    pub captured_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepositoryStats {
    pub entries: usize,
    pub with_snapshot: usize,
    pub oldest_captured_at: Option<DateTime<Utc>>,
}

mod image_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
