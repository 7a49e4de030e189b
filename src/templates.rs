//! Built-in resume templates.
//!
//! Each template is a table of Tailwind-like class strings, one per visual
//! role. The registry is immutable and passed explicitly to the renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a built-in template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Minimal,
    Professional,
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Professional,
        TemplateId::Creative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Professional => "professional",
            TemplateId::Creative => "creative",
        }
    }

    fn slot(self) -> usize {
        match self {
            TemplateId::Classic => 0,
            TemplateId::Modern => 1,
            TemplateId::Minimal => 2,
            TemplateId::Professional => 3,
            TemplateId::Creative => 4,
        }
    }
}

impl FromStr for TemplateId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or(Error::UnknownTemplate(wanted))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class strings for every styled role of the rendered resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStyles {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    /// Card styling for template pickers, exposed via [`TemplateInfo`];
    /// not applied to pages.
    pub container: String,
    pub header: String,
    pub name_text: String,
    pub title: String,
    pub section_header: String,
    pub section: String,
    pub item_title: String,
    pub item_subtitle: String,
    pub item_date: String,
    pub skill: String,
    pub skills_container: String,
    pub text: String,
}

/// Summary row for template pickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    /// Classes for the picker card.
    pub container: String,
}

/// Immutable template table keyed by [`TemplateId`]. Every id always has an
/// entry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    styles: [TemplateStyles; 5],
}

impl TemplateRegistry {
    /// The five built-in templates.
    pub fn builtin() -> Self {
        Self {
            styles: [classic(), modern(), minimal(), professional(), creative()],
        }
    }

    /// Replace one template's styles, returning the new registry.
    pub fn with_template(mut self, styles: TemplateStyles) -> Self {
        let slot = styles.id.slot();
        self.styles[slot] = styles;
        self
    }

    pub fn get(&self, id: TemplateId) -> &TemplateStyles {
        &self.styles[id.slot()]
    }

    /// Look up by string id, falling back to the default template for
    /// unknown ids.
    pub fn get_or_default(&self, id: &str) -> &TemplateStyles {
        match id.parse::<TemplateId>() {
            Ok(id) => self.get(id),
            Err(_) => {
                log::warn!("unknown template '{id}', using {}", TemplateId::default());
                self.get(TemplateId::default())
            }
        }
    }

    pub fn list(&self) -> Vec<TemplateInfo> {
        self.styles
            .iter()
            .map(|t| TemplateInfo {
                id: t.id,
                name: t.name.clone(),
                description: t.description.clone(),
                container: t.container.clone(),
            })
            .collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn styles(
    id: TemplateId,
    name: &str,
    description: &str,
    container: &str,
    header: &str,
    name_text: &str,
    title: &str,
    section_header: &str,
    item: [&str; 3],
    skill: &str,
    skills_container: &str,
    text: &str,
) -> TemplateStyles {
    let [item_title, item_subtitle, item_date] = item;
    TemplateStyles {
        id,
        name: name.to_string(),
        description: description.to_string(),
        container: container.to_string(),
        header: header.to_string(),
        name_text: name_text.to_string(),
        title: title.to_string(),
        section_header: section_header.to_string(),
        section: "mb-6".to_string(),
        item_title: item_title.to_string(),
        item_subtitle: item_subtitle.to_string(),
        item_date: item_date.to_string(),
        skill: skill.to_string(),
        skills_container: skills_container.to_string(),
        text: text.to_string(),
    }
}

fn classic() -> TemplateStyles {
    styles(
        TemplateId::Classic,
        "Classic",
        "A traditional resume format with a clean, professional layout",
        "bg-white p-6 rounded-md shadow border border-gray-200",
        "text-center mb-6",
        "text-2xl font-bold text-gray-800",
        "text-lg text-gray-600",
        "text-lg font-semibold border-b border-gray-300 pb-1 mb-2 text-gray-800",
        ["font-medium text-gray-800", "text-gray-700", "text-sm text-gray-600"],
        "bg-gray-200 px-2 py-1 text-sm rounded text-gray-800",
        "flex flex-wrap gap-1",
        "text-sm text-gray-700",
    )
}

fn modern() -> TemplateStyles {
    styles(
        TemplateId::Modern,
        "Modern",
        "A contemporary design with bold section headers and clean typography",
        "bg-white p-6 rounded-md shadow-md",
        "border-l-4 border-blue-500 pl-4 mb-6",
        "text-2xl font-bold text-gray-900",
        "text-lg text-blue-600 font-medium",
        "text-lg font-semibold border-l-4 border-blue-500 pl-2 mb-3 text-gray-900",
        ["font-semibold text-gray-900", "text-blue-600", "text-sm text-gray-600 italic"],
        "bg-blue-100 text-blue-800 px-3 py-1 rounded-full text-sm",
        "flex flex-wrap gap-2",
        "text-sm text-gray-700 leading-relaxed",
    )
}

fn minimal() -> TemplateStyles {
    styles(
        TemplateId::Minimal,
        "Minimal",
        "A minimalist design focusing on content with subtle styling",
        "bg-white p-6 rounded-md",
        "mb-6 pb-3 border-b border-gray-200",
        "text-2xl font-light text-gray-800",
        "text-gray-500",
        "uppercase tracking-wider text-sm font-medium text-gray-500 mb-3",
        ["font-medium text-gray-800", "text-gray-600", "text-sm text-gray-500"],
        "mr-3 text-gray-600 text-sm",
        "flex flex-wrap",
        "text-sm text-gray-600 leading-relaxed",
    )
}

fn professional() -> TemplateStyles {
    // The card version bleeds the header into the card padding; on a page the
    // margin already frames it, so the header keeps its own padding only.
    styles(
        TemplateId::Professional,
        "Professional",
        "A structured, business-focused layout for corporate positions",
        "bg-gray-50 p-6 rounded-md border border-gray-300 shadow-sm",
        "bg-gray-800 text-white p-4 mb-6 rounded-t-md",
        "text-2xl font-bold",
        "text-gray-300",
        "text-lg font-semibold text-gray-800 border-b-2 border-gray-800 pb-1 mb-3",
        ["font-semibold text-gray-800", "text-gray-700", "text-sm font-medium text-gray-600"],
        "bg-gray-800 text-white px-2 py-1 text-xs rounded",
        "flex flex-wrap gap-1",
        "text-sm text-gray-700",
    )
}

fn creative() -> TemplateStyles {
    styles(
        TemplateId::Creative,
        "Creative",
        "A vibrant design for creative fields and positions",
        "bg-gradient-to-br from-purple-50 to-indigo-50 p-6 rounded-md shadow-md",
        "mb-6 text-center",
        "text-3xl font-bold text-indigo-900",
        "text-lg text-purple-600",
        "text-lg font-semibold text-indigo-800 border-b border-purple-300 pb-1 mb-3",
        ["font-semibold text-indigo-900", "text-purple-700", "text-sm text-indigo-600"],
        "bg-gradient-to-r from-indigo-500 to-purple-500 text-white px-3 py-1 rounded-full text-sm",
        "flex flex-wrap gap-2",
        "text-sm text-indigo-900",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_resolves_to_its_own_styles() {
        let registry = TemplateRegistry::builtin();
        for id in TemplateId::ALL {
            assert_eq!(registry.get(id).id, id);
        }
    }

    #[test]
    fn unknown_id_falls_back_to_classic() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.get_or_default("retro").id, TemplateId::Classic);
        assert_eq!(registry.get_or_default("Modern").id, TemplateId::Modern);
    }

    #[test]
    fn list_preserves_picker_order() {
        let names: Vec<String> = TemplateRegistry::builtin()
            .list()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            ["Classic", "Modern", "Minimal", "Professional", "Creative"]
        );
    }

    #[test]
    fn list_carries_picker_card_styles() {
        let registry = TemplateRegistry::builtin();
        for info in registry.list() {
            assert!(!info.container.is_empty(), "{} has no card style", info.id);
            assert_eq!(info.container, registry.get(info.id).container);
        }
    }

    #[test]
    fn override_replaces_only_one_slot() {
        let mut custom = TemplateRegistry::builtin().get(TemplateId::Minimal).clone();
        custom.name = "Minimal+".into();
        let registry = TemplateRegistry::builtin().with_template(custom);
        assert_eq!(registry.get(TemplateId::Minimal).name, "Minimal+");
        assert_eq!(registry.get(TemplateId::Classic).name, "Classic");
    }
}
