// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static concept articles (loaded from the catalog file, never persisted).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ConceptCategory {
    #[serde(rename = "Core CLI")]
    CoreCli,
    Intelligence,
    Memory,
    Automation,
    Integration,
}

impl ConceptCategory {
    pub const ALL: [ConceptCategory; 5] = [
        ConceptCategory::CoreCli,
        ConceptCategory::Intelligence,
        ConceptCategory::Memory,
        ConceptCategory::Automation,
        ConceptCategory::Integration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConceptCategory::CoreCli => "Core CLI",
            ConceptCategory::Intelligence => "Intelligence",
            ConceptCategory::Memory => "Memory",
            ConceptCategory::Automation => "Automation",
            ConceptCategory::Integration => "Integration",
        }
    }

    /// Parse a category label as used in `?category=` filters.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CodeSample {
    pub language: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Screenshot {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptSection {
    pub heading: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeSample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,
    /// Render screenshots as a carousel instead of a stack.
    #[serde(default)]
    pub carousel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConceptReference {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A concept article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Concept {
    pub slug: String,
    pub title: String,
    pub emoji: String,
    pub category: ConceptCategory,
    pub difficulty: Difficulty,
    pub short_desc: String,
    pub sections: Vec<ConceptSection>,
    #[serde(default)]
    pub released: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ConceptReference>,
}

/// Route whose cached data depends on this concept's likes and comments.
pub fn concept_route(slug: &str) -> String {
    format!("/concepts/{}", slug)
}
