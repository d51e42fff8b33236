// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod comment;
pub mod concept;
pub mod like;
pub mod profile;

pub use comment::{AuthorProfile, ConceptComment, ConceptEngagement, Reply, TopLevelComment};
pub use concept::{Concept, ConceptCategory, Difficulty};
pub use like::{CommentLike, ConceptLike};
pub use profile::Profile;
