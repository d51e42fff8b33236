// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static concept catalog.
//!
//! Articles live in a JSON file shipped with the service and are loaded once
//! at startup. Nothing here touches the store.

use crate::models::{Concept, ConceptCategory};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// How many related concepts the concept page shows.
pub const RELATED_LIMIT: usize = 3;

/// Errors from loading the catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Invalid concept {slug:?}: {reason}")]
    Invalid { slug: String, reason: String },
}

/// Concept articles in file order.
#[derive(Debug, Clone)]
pub struct ConceptCatalog {
    concepts: Vec<Concept>,
}

impl ConceptCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON array of concepts.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let concepts: Vec<Concept> =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let mut seen = HashSet::new();
        for concept in &concepts {
            validate(concept)?;
            if !seen.insert(concept.slug.as_str()) {
                return Err(invalid(concept, "duplicate slug"));
            }
        }

        let released = concepts.iter().filter(|c| c.released).count();
        tracing::info!(
            concepts = concepts.len(),
            released,
            "Loaded concept catalog"
        );

        Ok(Self { concepts })
    }

    /// All concepts, optionally restricted to one category.
    pub fn list(&self, category: Option<ConceptCategory>) -> Vec<&Concept> {
        self.concepts
            .iter()
            .filter(|c| category.is_none_or(|wanted| c.category == wanted))
            .collect()
    }

    /// A concept whose page is live. Unreleased concepts are listed but
    /// cannot be opened.
    pub fn get_released(&self, slug: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.slug == slug && c.released)
    }

    /// Up to `limit` other concepts from the same category, in file order.
    pub fn related(&self, slug: &str, limit: usize) -> Vec<&Concept> {
        let Some(concept) = self.concepts.iter().find(|c| c.slug == slug) else {
            return Vec::new();
        };

        self.concepts
            .iter()
            .filter(|c| c.category == concept.category && c.slug != concept.slug)
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

fn invalid(concept: &Concept, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        slug: concept.slug.clone(),
        reason: reason.to_string(),
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn validate(concept: &Concept) -> Result<(), CatalogError> {
    if blank(&concept.slug) {
        return Err(invalid(concept, "empty slug"));
    }
    if blank(&concept.title) || blank(&concept.emoji) || blank(&concept.short_desc) {
        return Err(invalid(concept, "missing title, emoji or short description"));
    }
    if concept.sections.is_empty() {
        return Err(invalid(concept, "no sections"));
    }

    for section in &concept.sections {
        if blank(&section.heading) {
            return Err(invalid(concept, "section without heading"));
        }
        let problem = if blank(&section.body) {
            Some("has an empty body")
        } else if section
            .screenshots
            .iter()
            .any(|s| blank(&s.src) || blank(&s.alt))
        {
            Some("has a screenshot without src or alt")
        } else if section.carousel && section.screenshots.is_empty() {
            Some("is a carousel without screenshots")
        } else if section
            .code
            .as_ref()
            .is_some_and(|c| blank(&c.language) || blank(&c.content))
        {
            Some("has an incomplete code sample")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(invalid(
                concept,
                &format!("section {:?} {}", section.heading, problem),
            ));
        }
    }

    if concept
        .references
        .iter()
        .any(|r| blank(&r.label) || blank(&r.url))
    {
        return Err(invalid(concept, "reference without label or url"));
    }

    Ok(())
}
