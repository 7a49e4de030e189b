//! Resume document model – the structured data the form layer edits.
//!
//! The engine only reads it. Field names serialise in camelCase so bundles
//! written by the browser build load unchanged.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Contact details and summary. `summary` holds rich-text HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}

/// One work-experience entry. `description` holds rich-text HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceItem {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub is_current_position: bool,
}

impl ExperienceItem {
    /// Entries with neither company nor position are not rendered.
    pub fn is_listed(&self) -> bool {
        !self.company.is_empty() || !self.position.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub graduation_date: String,
    pub gpa: String,
}

impl EducationItem {
    /// Entries with neither institution nor degree are not rendered.
    pub fn is_listed(&self) -> bool {
        !self.institution.is_empty() || !self.degree.is_empty()
    }
}

/// The complete resume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal: PersonalInfo,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub skills: Vec<String>,
}

impl Default for ResumeDocument {
    /// A blank form: one empty experience row, one empty education row.
    fn default() -> Self {
        Self {
            personal: PersonalInfo::default(),
            experience: vec![ExperienceItem::default()],
            education: vec![EducationItem::default()],
            skills: Vec::new(),
        }
    }
}

impl ResumeDocument {
    /// Stable content fingerprint used as the document entry of the preview's
    /// dependency list.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_one_blank_row_each() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.education.len(), 1);
        assert!(doc.skills.is_empty());
        assert!(!doc.experience[0].is_listed());
    }

    #[test]
    fn camel_case_json_with_missing_fields() {
        let json = r#"{
            "personal": { "name": "Ada Lovelace" },
            "experience": [{ "company": "Analytical Engines", "isCurrentPosition": true, "startDate": "1842" }]
        }"#;
        let doc = ResumeDocument::from_json(json).unwrap();
        assert_eq!(doc.personal.name, "Ada Lovelace");
        assert!(doc.experience[0].is_current_position);
        assert_eq!(doc.experience[0].start_date, "1842");
        // Absent sections come from the blank form.
        assert_eq!(doc.education.len(), 1);
        assert!(!doc.education[0].is_listed());
    }

    #[test]
    fn hash_tracks_content() {
        let a = ResumeDocument::default();
        let mut b = a.clone();
        assert_eq!(a.content_hash(), b.content_hash());
        b.skills.push("Rust".into());
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
