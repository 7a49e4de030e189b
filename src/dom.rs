//! HTML parser – converts the rich-text fragments stored in the resume into a
//! simple DOM tree, and provides builders for the renderer.
//!
//! We support a controlled subset of elements:
//! - Structural: div, p, h1-h3, ul, ol, li, br
//! - Inline: span, strong/b, em/i, u
//! - Styling via `class` and `style` attributes
//!
//! Anything else is dropped together with its children by [`sanitize`].

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    Ul,
    Ol,
    Li,
    Span,
    Strong,
    Em,
    U,
    Br,
    Body,
    Html,
    Head,
    /// Unsupported tag; removed by [`sanitize`].
    Unknown(String),
}

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "span" => Tag::Span,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "u" => Tag::U,
            "br" => Tag::Br,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    /// Void elements never have children or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br)
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// Builders used by the content renderer
// ---------------------------------------------------------------------------

/// Element with a class list and children.
pub fn element(tag: Tag, class: &str, children: Vec<DomNode>) -> DomNode {
    let mut e = ElementNode::new(tag);
    if !class.trim().is_empty() {
        e.attributes.insert("class".to_string(), class.to_string());
    }
    e.children = children;
    DomNode::Element(e)
}

/// Plain text node. No escaping is needed: text never goes through the parser.
pub fn text(s: impl Into<String>) -> DomNode {
    DomNode::Text(s.into())
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent over HTML
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of DOM nodes.
///
/// We use a hand-written parser that handles the controlled subset produced
/// by the rich-text editor.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    parser.parse_nodes()
}

/// Parse a user-supplied rich-text fragment and strip unsupported markup.
pub fn parse_fragment(html: &str) -> Vec<DomNode> {
    sanitize(body_children(&parse_html(html)))
}

/// Classes the rich-text editor may emit.
const ALLOWED_CLASSES: &[&str] = &["text-left", "text-center", "text-right", "text-justify"];

/// Inline style properties the rich-text editor may emit.
const ALLOWED_STYLE_PROPERTIES: &[&str] = &["font-size", "color"];

/// Remove unsupported elements (scripts, styles, unknown tags) and their
/// subtrees, and strip attributes down to what the editor produces.
pub fn sanitize(nodes: Vec<DomNode>) -> Vec<DomNode> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            DomNode::Element(e) if matches!(e.tag, Tag::Unknown(_) | Tag::Head) => None,
            DomNode::Element(mut e) => {
                e.attributes = sanitize_attributes(&e.attributes);
                e.children = sanitize(std::mem::take(&mut e.children));
                Some(DomNode::Element(e))
            }
            text @ DomNode::Text(_) => Some(text),
        })
        .collect()
}

/// Keep only text-alignment classes and `font-size`/`color` declarations.
/// Everything else (ids, handlers, layout classes, sizing styles) is dropped.
fn sanitize_attributes(attributes: &HashMap<String, String>) -> HashMap<String, String> {
    let mut kept = HashMap::new();

    if let Some(class) = attributes.get("class") {
        let classes: Vec<&str> = class
            .split_whitespace()
            .filter(|c| ALLOWED_CLASSES.contains(c))
            .collect();
        if !classes.is_empty() {
            kept.insert("class".to_string(), classes.join(" "));
        }
    }

    if let Some(style) = attributes.get("style") {
        let declarations: Vec<String> = style
            .split(';')
            .filter_map(|decl| {
                let (property, value) = decl.split_once(':')?;
                let property = property.trim().to_ascii_lowercase();
                let value = value.trim();
                (ALLOWED_STYLE_PROPERTIES.contains(&property.as_str()) && !value.is_empty())
                    .then(|| format!("{property}: {value}"))
            })
            .collect();
        if !declarations.is_empty() {
            kept.insert("style".to_string(), declarations.join("; "));
        }
    }

    kept
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace_preserve();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Skip doctype / processing instructions
            while !self.eof() && !self.starts_with(">") {
                self.advance(1);
            }
            if !self.eof() {
                self.advance(1); // skip '>'
            }
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        let text = &self.input[start..self.pos];
        DomNode::Text(decode_entities(text))
    }

    fn parse_element(&mut self) -> DomNode {
        // Consume '<'
        self.advance(1);
        let tag_name = self.parse_tag_name();
        let tag = Tag::from_name(&tag_name);
        let mut elem = ElementNode::new(tag.clone());

        // Parse attributes
        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            if key.is_empty() {
                // Stray character inside the tag; skip it rather than loop.
                self.advance(1);
                continue;
            }
            elem.attributes.insert(key.to_ascii_lowercase(), value);
        }

        if self.starts_with("/>") {
            self.advance(2);
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if tag.is_void() {
            return DomNode::Element(elem);
        }

        // Parse children
        elem.children = self.parse_nodes();

        // Consume closing tag
        if self.starts_with("</") {
            self.advance(2);
            self.parse_tag_name(); // skip tag name
            self.skip_whitespace();
            if self.starts_with(">") {
                self.advance(1);
            }
        }

        DomNode::Element(elem)
    }

    fn parse_tag_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_tag_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance(1); // skip '='
        self.skip_whitespace();
        let value = self.parse_attr_value();
        (key, value)
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ["\"", "'"] {
            if self.starts_with(quote) {
                self.advance(1);
                let start = self.pos;
                while !self.eof() && !self.starts_with(quote) {
                    self.advance(1);
                }
                let val = self.input[start..self.pos].to_string();
                if !self.eof() {
                    self.advance(1);
                }
                return decode_entities(&val);
            }
        }
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.advance(1);
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    fn skip_whitespace_preserve(&mut self) {
        // Skip runs of pure whitespace between elements.
        let saved = self.pos;
        self.skip_whitespace();
        // If we reached a tag or EOF, keep the skip. Otherwise revert.
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4); // skip <!--
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self, n: usize) {
        // Advance by `n` characters (not bytes).
        for _ in 0..n {
            if let Some(c) = self.current_char() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Convenience helpers
// ---------------------------------------------------------------------------

/// Find the `<body>` element and return its children, or return all nodes if
/// no `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            // Recurse into <html>
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}

/// Concatenated text of a subtree, with `<br>` as a newline.
pub fn text_content(nodes: &[DomNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            DomNode::Text(t) => out.push_str(t),
            DomNode::Element(e) if e.tag == Tag::Br => out.push('\n'),
            DomNode::Element(e) => out.push_str(&text_content(&e.children)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rich_text_paragraphs() {
        let html = "<p>Led <strong>five</strong> engineers</p><p>Shipped <em>v2</em></p>";
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 2);
        if let DomNode::Element(p) = &nodes[0] {
            assert_eq!(p.tag, Tag::P);
            assert_eq!(p.children.len(), 3); // "Led ", <strong>, " engineers"
        } else {
            panic!("Expected p element");
        }
    }

    #[test]
    fn parse_list_with_paragraph_items() {
        let html = "<ul><li><p>One</p></li><li><p>Two</p></li></ul>";
        let nodes = parse_html(html);
        if let DomNode::Element(ul) = &nodes[0] {
            assert_eq!(ul.tag, Tag::Ul);
            assert_eq!(ul.children.len(), 2);
        } else {
            panic!("Expected <ul>");
        }
    }

    #[test]
    fn br_is_void() {
        let nodes = parse_html("<p>a<br>b</p>");
        assert_eq!(text_content(&nodes), "a\nb");
    }

    #[test]
    fn inline_style_attribute_is_kept() {
        let nodes = parse_html(r#"<span style="font-size: 18px">Big</span>"#);
        if let DomNode::Element(e) = &nodes[0] {
            assert_eq!(e.inline_style(), Some("font-size: 18px"));
        } else {
            panic!("Expected span");
        }
    }

    #[test]
    fn sanitize_drops_scripts_and_unknown_tags() {
        let nodes = parse_fragment("<p>Safe</p><script>alert('x')</script><iframe>bad</iframe>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(text_content(&nodes), "Safe");
    }

    #[test]
    fn sanitize_keeps_only_alignment_classes_and_text_styles() {
        let nodes = parse_fragment(
            r#"<p id="x" onclick="go()" class="h-screen text-center p-96" style="height: 100000px; color: red; FONT-SIZE : 18px; padding-top: 9999px">Hi</p>"#,
        );
        let DomNode::Element(p) = &nodes[0] else {
            panic!("Expected p");
        };
        assert_eq!(p.classes(), vec!["text-center"]);
        assert_eq!(p.inline_style(), Some("color: red; font-size: 18px"));
        assert_eq!(p.attributes.len(), 2);
    }

    #[test]
    fn sanitize_drops_attributes_with_nothing_allowed() {
        let nodes = parse_fragment(
            r#"<div class="h-screen mb-96" style="height: 100000000000000000000px"><span style="width:1e9px">x</span></div>"#,
        );
        let DomNode::Element(div) = &nodes[0] else {
            panic!("Expected div");
        };
        assert!(div.attributes.is_empty());
        let DomNode::Element(span) = &div.children[0] else {
            panic!("Expected span");
        };
        assert!(span.attributes.is_empty());
    }

    #[test]
    fn entities_decode_once() {
        let nodes = parse_html("<p>R&amp;D &amp;lt;team&amp;gt;</p>");
        assert_eq!(text_content(&nodes), "R&D &lt;team&gt;");
    }

    #[test]
    fn plain_text_fragment() {
        let nodes = parse_fragment("Just a sentence.");
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], DomNode::Text(t) if t == "Just a sentence."));
    }
}
