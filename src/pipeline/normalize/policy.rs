use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DATE_FORMATS;
use crate::types::SchemaVariant;

/// How the schema enforcer fills a column that no record in the batch carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenColumnPolicy {
    /// Numeric columns get `0`, everything else the `"Missing"` placeholder
    Placeholder,
    /// Every unseen column starts out null and is resolved by later stages
    Absent,
}

/// How phone values are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonePolicy {
    /// Only null or empty phones are replaced (with `"Unknown"`)
    FillUnknown,
    /// Anything but a non-empty run of ASCII digits becomes `"Invalid Number"`
    RequireDigits,
}

/// Designation assigned when `years_of_experience` is null or unparseable
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownExperiencePolicy {
    /// Treat unknown experience like the minimum, i.e. the lowest band
    #[default]
    LowestBand,
    /// Assign a fixed label outside the four experience bands
    Label(String),
}

/// Fully resolved set of policies the normalizer runs with
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationPolicy {
    pub variant: SchemaVariant,
    pub unseen_columns: UnseenColumnPolicy,
    pub phone: PhonePolicy,
    /// When true a missing or non-numeric age becomes `0`; otherwise it stays absent
    pub enforce_age: bool,
    pub unknown_experience: UnknownExperiencePolicy,
    pub date_formats: Vec<String>,
}

impl NormalizationPolicy {
    /// Preset matching the behavior each schema variant was built around
    pub fn for_variant(variant: SchemaVariant) -> Self {
        let (unseen_columns, phone, enforce_age) = match variant {
            SchemaVariant::Manual => (UnseenColumnPolicy::Placeholder, PhonePolicy::FillUnknown, true),
            SchemaVariant::ExperienceBucketed => {
                (UnseenColumnPolicy::Absent, PhonePolicy::RequireDigits, false)
            }
        };

        Self {
            variant,
            unseen_columns,
            phone,
            enforce_age,
            unknown_experience: UnknownExperiencePolicy::default(),
            date_formats: default_date_formats(),
        }
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::for_variant(SchemaVariant::default())
    }
}

pub fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}
