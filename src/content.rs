//! Content renderer – turns a [`ResumeDocument`] and a template into the
//! styled tree that the layout engine measures and places.
//!
//! Section order is fixed: header, summary, experience, education, skills.
//! Sections without listed entries are left out entirely.

use crate::dom::{self, element, text, DomNode, Tag};
use crate::model::{EducationItem, ExperienceItem, PersonalInfo, ResumeDocument};
use crate::style::{build_styled_tree, StyledNode};
use crate::templates::TemplateStyles;

const CONTACT_ROW: &str = "mt-2 flex flex-wrap justify-center gap-2 text-xs text-gray-600";
const CONTACT_ITEM: &str = "whitespace-nowrap";
const ITEM: &str = "mb-4";
const ITEM_HEADER: &str = "w-full flex flex-col mb-1";
const ITEM_DETAILS: &str = "flex justify-between items-center";
const ITEM_DATE_EXTRA: &str = "text-xs whitespace-nowrap";

/// The rendered, styled resume content for one template.
#[derive(Debug, Clone)]
pub struct ContentTree {
    pub nodes: Vec<StyledNode>,
}

impl ContentTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Render and style the document.
pub fn render_content(doc: &ResumeDocument, styles: &TemplateStyles) -> ContentTree {
    let dom = render_dom(doc, styles);
    ContentTree {
        nodes: build_styled_tree(&dom, None),
    }
}

/// Render the document into an unstyled DOM.
pub fn render_dom(doc: &ResumeDocument, styles: &TemplateStyles) -> Vec<DomNode> {
    let mut out = vec![render_header(&doc.personal, styles)];

    if !doc.personal.summary.is_empty() {
        out.push(section(
            styles,
            "Professional Summary",
            vec![rich_text(&doc.personal.summary, styles)],
        ));
    }

    if doc.experience.iter().any(ExperienceItem::is_listed) {
        let items = doc
            .experience
            .iter()
            .filter(|e| e.is_listed())
            .map(|e| render_experience(e, styles))
            .collect();
        out.push(section(styles, "Work Experience", items));
    }

    if doc.education.iter().any(EducationItem::is_listed) {
        let items = doc
            .education
            .iter()
            .filter(|e| e.is_listed())
            .map(|e| render_education(e, styles))
            .collect();
        out.push(section(styles, "Education", items));
    }

    if !doc.skills.is_empty() {
        let skills = doc
            .skills
            .iter()
            .map(|s| element(Tag::Span, &styles.skill, vec![text(s)]))
            .collect();
        out.push(section(
            styles,
            "Skills",
            vec![element(Tag::Div, &styles.skills_container, skills)],
        ));
    }

    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn render_header(p: &PersonalInfo, styles: &TemplateStyles) -> DomNode {
    let contacts = [&p.email, &p.phone, &p.location]
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(|c| element(Tag::Span, CONTACT_ITEM, vec![text(c)]))
        .collect();

    element(
        Tag::Div,
        &styles.header,
        vec![
            element(
                Tag::H1,
                &styles.name_text,
                vec![text(or_placeholder(&p.name, "Your Name"))],
            ),
            element(
                Tag::P,
                &styles.title,
                vec![text(or_placeholder(&p.title, "Professional Title"))],
            ),
            element(Tag::Div, CONTACT_ROW, contacts),
        ],
    )
}

fn section(styles: &TemplateStyles, heading: &str, body: Vec<DomNode>) -> DomNode {
    let mut children = vec![element(Tag::H2, &styles.section_header, vec![text(heading)])];
    children.extend(body);
    element(Tag::Div, &styles.section, children)
}

fn item_header(styles: &TemplateStyles, title: &str, subtitle: String, date: String) -> DomNode {
    let date_class = format!("{} {}", styles.item_date, ITEM_DATE_EXTRA);
    element(
        Tag::Div,
        ITEM_HEADER,
        vec![
            element(Tag::H3, &styles.item_title, vec![text(title)]),
            element(
                Tag::Div,
                ITEM_DETAILS,
                vec![
                    element(Tag::Span, &styles.item_subtitle, vec![text(subtitle)]),
                    element(Tag::Span, &date_class, vec![text(date)]),
                ],
            ),
        ],
    )
}

fn render_experience(e: &ExperienceItem, styles: &TemplateStyles) -> DomNode {
    let end = if e.is_current_position {
        "Present"
    } else {
        or_placeholder(&e.end_date, "End Date")
    };
    let date = format!("{} - {}", or_placeholder(&e.start_date, "Start Date"), end);

    let mut children = vec![item_header(
        styles,
        or_placeholder(&e.position, "Position"),
        or_placeholder(&e.company, "Company").to_string(),
        date,
    )];
    if !e.description.is_empty() {
        children.push(rich_text(&e.description, styles));
    }
    element(Tag::Div, ITEM, children)
}

fn render_education(e: &EducationItem, styles: &TemplateStyles) -> DomNode {
    let mut subtitle = or_placeholder(&e.degree, "Degree").to_string();
    if !e.field.is_empty() {
        subtitle.push_str(&format!(" in {}", e.field));
    }
    if !e.gpa.is_empty() {
        subtitle.push_str(&format!(" - GPA: {}", e.gpa));
    }

    element(
        Tag::Div,
        ITEM,
        vec![item_header(
            styles,
            or_placeholder(&e.institution, "Institution"),
            subtitle,
            or_placeholder(&e.graduation_date, "Graduation Date").to_string(),
        )],
    )
}

/// Sanitised rich-text fragment wrapped in the template's body-text styling.
fn rich_text(html: &str, styles: &TemplateStyles) -> DomNode {
    let mut nodes = dom::parse_fragment(html);
    decorate_rich_text(&mut nodes);
    element(Tag::Div, &styles.text, nodes)
}

/// Editor output spacing: paragraphs get a small bottom margin and lists an
/// indent for their markers.
fn decorate_rich_text(nodes: &mut [DomNode]) {
    for node in nodes {
        if let DomNode::Element(e) = node {
            let extra = match e.tag {
                Tag::P => Some("mb-1"),
                Tag::Ul | Tag::Ol => Some("pl-6"),
                _ => None,
            };
            if let Some(extra) = extra {
                let class = match e.attributes.get("class") {
                    Some(existing) => format!("{extra} {existing}"),
                    None => extra.to_string(),
                };
                e.attributes.insert("class".to_string(), class);
            }
            decorate_rich_text(&mut e.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::text_content;
    use crate::templates::{TemplateId, TemplateRegistry};

    fn classic() -> TemplateStyles {
        TemplateRegistry::builtin().get(TemplateId::Classic).clone()
    }

    fn rendered_text(doc: &ResumeDocument) -> String {
        text_content(&render_dom(doc, &classic()))
    }

    #[test]
    fn blank_document_shows_placeholders_only() {
        let dom = render_dom(&ResumeDocument::default(), &classic());
        assert_eq!(dom.len(), 1);
        let t = text_content(&dom);
        assert!(t.contains("Your Name"));
        assert!(t.contains("Professional Title"));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let mut doc = ResumeDocument::default();
        doc.personal.summary = "<p>Builder of things</p>".into();
        doc.experience[0].company = "Acme".into();
        doc.education[0].degree = "BSc".into();
        doc.skills = vec!["Rust".into()];
        let t = rendered_text(&doc);
        let order = ["Professional Summary", "Work Experience", "Education", "Skills"]
            .map(|h| t.find(h).unwrap());
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn experience_dates_and_placeholders() {
        let mut doc = ResumeDocument::default();
        doc.experience[0].company = "Acme".into();
        doc.experience[0].start_date = "2020".into();
        let t = rendered_text(&doc);
        assert!(t.contains("Position"));
        assert!(t.contains("2020 - End Date"));

        doc.experience[0].is_current_position = true;
        assert!(rendered_text(&doc).contains("2020 - Present"));
    }

    #[test]
    fn unlisted_entries_are_skipped() {
        let mut doc = ResumeDocument::default();
        doc.experience.push(ExperienceItem {
            position: "Engineer".into(),
            ..Default::default()
        });
        let t = rendered_text(&doc);
        assert_eq!(t.matches("Company").count(), 1);
    }

    #[test]
    fn education_subtitle_composition() {
        let mut doc = ResumeDocument::default();
        doc.education[0] = EducationItem {
            institution: "MIT".into(),
            degree: "BSc".into(),
            field: "Physics".into(),
            gpa: "3.9".into(),
            graduation_date: String::new(),
        };
        let t = rendered_text(&doc);
        assert!(t.contains("BSc in Physics - GPA: 3.9"));
        assert!(t.contains("Graduation Date"));
    }

    #[test]
    fn contact_items_only_when_present() {
        let mut doc = ResumeDocument::default();
        doc.personal.email = "ada@example.com".into();
        let dom = render_dom(&doc, &classic());
        let DomNode::Element(header) = &dom[0] else {
            panic!("expected header");
        };
        let DomNode::Element(contacts) = &header.children[2] else {
            panic!("expected contact row");
        };
        assert_eq!(contacts.children.len(), 1);
    }

    #[test]
    fn rich_text_is_sanitised_and_decorated() {
        let mut doc = ResumeDocument::default();
        doc.personal.summary = "<p>Hi</p><script>alert(1)</script><ul><li>x</li></ul>".into();
        let dom = render_dom(&doc, &classic());
        let t = text_content(&dom);
        assert!(!t.contains("alert"));

        let DomNode::Element(section) = &dom[1] else {
            panic!("expected section");
        };
        let DomNode::Element(body) = &section.children[1] else {
            panic!("expected body");
        };
        let DomNode::Element(p) = &body.children[0] else {
            panic!("expected paragraph");
        };
        assert!(p.classes().contains(&"mb-1"));
        let DomNode::Element(ul) = &body.children[1] else {
            panic!("expected list");
        };
        assert!(ul.classes().contains(&"pl-6"));
    }

    #[test]
    fn user_classes_are_filtered_before_decoration() {
        let mut doc = ResumeDocument::default();
        doc.personal.summary =
            r#"<p class="h-screen text-center p-96" style="min-height: 5000px">Hi</p>"#.into();
        let dom = render_dom(&doc, &classic());
        let DomNode::Element(section) = &dom[1] else {
            panic!("expected section");
        };
        let DomNode::Element(body) = &section.children[1] else {
            panic!("expected body");
        };
        let DomNode::Element(p) = &body.children[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.classes(), vec!["mb-1", "text-center"]);
        assert!(p.inline_style().is_none());
    }

    #[test]
    fn styled_tree_has_one_node_per_top_level_block() {
        let mut doc = ResumeDocument::default();
        doc.skills = vec!["Rust".into(), "SQL".into()];
        let tree = render_content(&doc, &classic());
        assert_eq!(tree.nodes.len(), 2);
    }
}
