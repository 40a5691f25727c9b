//! Field definitions for harvested records
//!
//! This module defines every field a record can carry, together with the wire key used
//! in configuration files, model responses and CSV headers.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named field of a harvested opportunity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldName {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "issuingOrganization")]
    IssuingOrganization,
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "publicationDate")]
    PublicationDate,
    #[serde(rename = "articleType")]
    ArticleType,
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "funder")]
    Funder,
    #[serde(rename = "fundingType")]
    FundingType,
    #[serde(rename = "researchStartDate")]
    ResearchStartDate,
    #[serde(rename = "researchEndDate")]
    ResearchEndDate,
    /// Field of study or research area
    #[serde(rename = "field")]
    StudyField,
    #[serde(rename = "keywords")]
    Keywords,
    #[serde(rename = "description")]
    Description,
}

impl FieldName {
    /// Number of known fields
    pub const COUNT: usize = 15;

    /// Every field in canonical order
    pub const ALL: [FieldName; Self::COUNT] = [
        Self::Title,
        Self::Url,
        Self::IssuingOrganization,
        Self::Amount,
        Self::PublicationDate,
        Self::ArticleType,
        Self::Summary,
        Self::Country,
        Self::Funder,
        Self::FundingType,
        Self::ResearchStartDate,
        Self::ResearchEndDate,
        Self::StudyField,
        Self::Keywords,
        Self::Description,
    ];

    /// Fields a list page provides for each stub
    pub const LISTED: [FieldName; 6] = [
        Self::Title,
        Self::Url,
        Self::IssuingOrganization,
        Self::Amount,
        Self::PublicationDate,
        Self::ArticleType,
    ];

    /// Fields that lead the CSV header, in this order
    pub const PRIORITY: [FieldName; 6] = [
        Self::Title,
        Self::Url,
        Self::Amount,
        Self::Summary,
        Self::ArticleType,
        Self::Description,
    ];

    /// Returns the wire key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Url => "url",
            Self::IssuingOrganization => "issuingOrganization",
            Self::Amount => "amount",
            Self::PublicationDate => "publicationDate",
            Self::ArticleType => "articleType",
            Self::Summary => "summary",
            Self::Country => "country",
            Self::Funder => "funder",
            Self::FundingType => "fundingType",
            Self::ResearchStartDate => "researchStartDate",
            Self::ResearchEndDate => "researchEndDate",
            Self::StudyField => "field",
            Self::Keywords => "keywords",
            Self::Description => "description",
        }
    }

    /// Parses a field from its wire key
    ///
    /// Returns None if the key doesn't match any known field.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }

    /// Position of this field in canonical order
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
