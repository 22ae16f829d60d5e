use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

const SIDE_DELIMITER: char = '_';

/// Image encodings accepted by the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Recognise a file by its extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

pub fn is_supported_image(file_name: &str) -> bool {
    ImageFormat::from_file_name(file_name).is_some()
}

/// Which face of a statement an image shows.
///
/// Only the exact tokens `front` and `back` take part in pairing; anything
/// else is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ImageSide {
    Front,
    Back,
    Other(String),
}

impl ImageSide {
    pub fn from_token(token: &str) -> Self {
        match token {
            "front" => ImageSide::Front,
            "back" => ImageSide::Back,
            other => ImageSide::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSide::Front => "front",
            ImageSide::Back => "back",
            ImageSide::Other(token) => token,
        }
    }
}

impl From<String> for ImageSide {
    fn from(token: String) -> Self {
        ImageSide::from_token(&token)
    }
}

impl From<ImageSide> for String {
    fn from(side: ImageSide) -> Self {
        side.as_str().to_string()
    }
}

impl fmt::Display for ImageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image file resolved to its claim and side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub claim_id: String,
    pub side: ImageSide,
    pub file_name: String,
    pub format: Option<ImageFormat>,
}

impl ImageReference {
    /// Parse `<claimId>_<side>.<ext>`.
    ///
    /// Directory components are dropped. A trailing `.jpg`, `.jpeg` or `.png`
    /// (any case) is stripped before splitting; tokens past the second are
    /// ignored. Returns `None` when the stem has fewer than two tokens or
    /// either token is empty.
    pub fn parse(file_name: &str) -> Option<Self> {
        let base_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name);

        let format = ImageFormat::from_file_name(base_name);
        let stem = match format {
            Some(_) => base_name
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(base_name),
            None => base_name,
        };

        let mut tokens = stem.split(SIDE_DELIMITER);
        let claim_id = tokens.next().filter(|t| !t.is_empty())?;
        let side = tokens.next().filter(|t| !t.is_empty())?;

        Some(ImageReference {
            claim_id: claim_id.to_string(),
            side: ImageSide::from_token(side),
            file_name: base_name.to_string(),
            format,
        })
    }
}

/// The images found for one claim identifier, by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimImages {
    pub sides: BTreeMap<ImageSide, String>,
}

impl ClaimImages {
    pub fn front(&self) -> Option<&str> {
        self.sides.get(&ImageSide::Front).map(String::as_str)
    }

    pub fn back(&self) -> Option<&str> {
        self.sides.get(&ImageSide::Back).map(String::as_str)
    }

    /// Both faces present.
    pub fn complete_pair(&self) -> Option<(&str, &str)> {
        Some((self.front()?, self.back()?))
    }

    /// The first of front/back that is missing, if any.
    pub fn missing_side(&self) -> Option<ImageSide> {
        if self.front().is_none() {
            Some(ImageSide::Front)
        } else if self.back().is_none() {
            Some(ImageSide::Back)
        } else {
            None
        }
    }
}

/// Result of grouping a file listing by claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimGroups {
    pub claims: BTreeMap<String, ClaimImages>,
    /// Files that do not follow `<claimId>_<side>`.
    pub unparsable: Vec<String>,
}

impl ClaimGroups {
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn get(&self, claim_id: &str) -> Option<&ClaimImages> {
        self.claims.get(claim_id)
    }

    pub fn complete_pairs(&self) -> usize {
        self.claims
            .values()
            .filter(|images| images.complete_pair().is_some())
            .count()
    }
}

/// Group file names by claim identifier.
///
/// Input order only matters for duplicates: when two files resolve to the same
/// claim and side, the later one wins.
pub fn group_claims<I, S>(file_names: I) -> ClaimGroups
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = ClaimGroups::default();

    for file_name in file_names {
        let file_name = file_name.as_ref();
        let Some(image) = ImageReference::parse(file_name) else {
            tracing::debug!(file = %file_name, "Skipping file without claim/side in its name");
            groups.unparsable.push(file_name.to_string());
            continue;
        };

        let previous = groups
            .claims
            .entry(image.claim_id.clone())
            .or_default()
            .sides
            .insert(image.side.clone(), image.file_name.clone());

        if let Some(previous) = previous {
            tracing::warn!(
                claim_id = %image.claim_id,
                side = %image.side,
                replaced = %previous,
                kept = %image.file_name,
                "Duplicate image for claim side, keeping the later file"
            );
        }
    }

    groups
}
