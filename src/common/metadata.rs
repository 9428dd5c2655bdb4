//! Document metadata carried into `meta.xml`.
//!
//! Mirrors the Dublin Core subset that OpenDocument stores in
//! `office:meta`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unified document metadata structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document author/creator
    pub author: Option<String>,
    /// Keywords associated with the document
    pub keywords: Option<String>,
    /// Document description/comments
    pub description: Option<String>,
    /// Creation date
    pub created: Option<DateTime<Utc>>,
    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}
