//! Formatting-preserving XML tree for Ableton Live device documents.
//!
//! Live compares devices byte-for-byte in places (undo history, "modified"
//! markers), so the tree keeps everything a serializer would normally throw
//! away: the declaration as written, whitespace text, comments, attribute
//! order, raw attribute escaping and the `<Tag />` spelling of empty
//! elements. Parsing and re-serializing an untouched document yields the
//! input text.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]; detached nodes stay
//! in the arena but are no longer reachable from the document.

pub mod path;

use std::collections::HashSet;
use std::fmt;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::trace;

pub use path::{Axis, Step, XmlPath};

const VALUE_ATTRIBUTE: &str = "Value";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("invalid path '{path}': {reason}")]
    Path { path: String, reason: String },
}

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    /// Character data, kept escaped exactly as it appeared.
    Text(String),
    CData(String),
    Comment(String),
    Pi(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
    /// Whitespace between the last attribute and `>` or `/>`.
    tail: String,
}

/// An attribute together with the exact spelling around it.
#[derive(Debug, Clone)]
struct Attribute {
    /// Whitespace before the key.
    leading: String,
    key: String,
    /// Everything between the key and the opening quote, `=` included.
    equals: String,
    quote: char,
    /// Escaped value as it appears between the quotes.
    raw: String,
}

impl Attribute {
    fn new(key: &str, raw: String) -> Self {
        Attribute {
            leading: " ".to_string(),
            key: key.to_string(),
            equals: "=".to_string(),
            quote: '"',
            raw,
        }
    }

    fn write(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.key);
        out.push_str(&self.equals);
        out.push(self.quote);
        out.push_str(&self.raw);
        out.push(self.quote);
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    declaration: Option<String>,
    nodes: Vec<NodeData>,
    root: NodeId,
}

const DOCUMENT: NodeId = NodeId(0);

impl Document {
    /// Parse a complete document (declaration optional, one root element).
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let (declaration, body) = split_declaration(text)?;
        let mut doc = Document {
            declaration,
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: DOCUMENT,
        };

        let mut reader = Reader::from_str(body);
        reader.trim_text(false);
        let mut stack = vec![DOCUMENT];
        loop {
            let event = reader.read_event().map_err(|err| {
                XmlError::Xml(format!("at byte {}: {err}", reader.buffer_position()))
            })?;
            let parent = stack[stack.len() - 1];
            match event {
                Event::Start(e) => {
                    let id = doc.alloc(NodeKind::Element(element_data(&e, false)?));
                    doc.attach(parent, id);
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let id = doc.alloc(NodeKind::Element(element_data(&e, true)?));
                    doc.attach(parent, id);
                }
                Event::End(e) => {
                    if stack.len() <= 1 {
                        return Err(XmlError::Xml(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    stack.pop();
                }
                Event::Text(e) => doc.push_leaf(parent, NodeKind::Text(raw_text(&e))),
                Event::CData(e) => doc.push_leaf(parent, NodeKind::CData(raw_text(&e))),
                Event::Comment(e) => doc.push_leaf(parent, NodeKind::Comment(raw_text(&e))),
                Event::PI(e) => doc.push_leaf(parent, NodeKind::Pi(raw_text(&e))),
                Event::DocType(e) => doc.push_leaf(parent, NodeKind::DocType(raw_text(&e))),
                Event::Decl(_) => {
                    return Err(XmlError::Invalid(
                        "XML declaration after the start of the document".into(),
                    ))
                }
                Event::Eof => break,
            }
        }

        if stack.len() > 1 {
            let open = doc.name(stack[stack.len() - 1]).unwrap_or_default().to_string();
            return Err(XmlError::Xml(format!("unclosed element <{open}>")));
        }
        let roots: Vec<NodeId> = doc.child_elements(DOCUMENT).collect();
        match roots.as_slice() {
            [root] => doc.root = *root,
            _ => {
                return Err(XmlError::Invalid(format!(
                    "expected exactly one root element, found {}",
                    roots.len()
                )))
            }
        }
        trace!(nodes = doc.nodes.len(), "parsed document");
        Ok(doc)
    }

    /// The XML declaration as written, including `<?` and `?>`.
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    /// Root element of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Element name, `None` for non-element nodes.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el.name.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Element(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent.filter(|parent| *parent != DOCUMENT)
    }

    /// Whether `id` is still reachable from the document node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_ancestor_or_self(DOCUMENT, id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// First direct child element called `name`.
    pub fn child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|child| self.name(*child) == Some(name))
    }

    /// All elements below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            if self.is_element(next) {
                out.push(next);
                pending.extend(self.node(next).children.iter().rev().copied());
            }
        }
        out
    }

    /// Unescaped attribute value.
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<String> {
        let NodeKind::Element(el) = &self.node(id).kind else {
            return None;
        };
        el.attributes.iter().find(|attr| attr.key == key).map(|attr| {
            unescape(&attr.raw)
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| attr.raw.clone())
        })
    }

    /// Shorthand for the `Value` attribute every Live leaf element carries.
    pub fn value(&self, id: NodeId) -> Option<String> {
        self.attribute(id, VALUE_ATTRIBUTE)
    }

    /// Set (or append) an attribute; existing attributes keep their position.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) -> Result<(), XmlError> {
        let el = self.element_mut(id)?;
        let raw = escape(value).into_owned();
        match el.attributes.iter_mut().find(|attr| attr.key == key) {
            Some(attr) => attr.raw = raw,
            None => el.attributes.push(Attribute::new(key, raw)),
        }
        Ok(())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl fmt::Display) -> Result<(), XmlError> {
        self.set_attribute(id, VALUE_ATTRIBUTE, &value.to_string())
    }

    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> Result<bool, XmlError> {
        let el = self.element_mut(id)?;
        let before = el.attributes.len();
        el.attributes.retain(|attr| attr.key != key);
        Ok(el.attributes.len() != before)
    }

    /// Evaluate a path expression relative to `from`.
    pub fn select(&self, from: NodeId, path: &str) -> Result<Vec<NodeId>, XmlError> {
        let path = XmlPath::parse(path)?;
        Ok(self.select_path(from, &path))
    }

    pub fn select_first(&self, from: NodeId, path: &str) -> Result<Option<NodeId>, XmlError> {
        Ok(self.select(from, path)?.into_iter().next())
    }

    pub fn select_path(&self, from: NodeId, path: &XmlPath) -> Vec<NodeId> {
        let mut current = vec![from];
        for step in path.steps() {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for &node in &current {
                let candidates = match step.axis {
                    Axis::Child => self.child_elements(node).collect(),
                    Axis::Descendant => self.descendants(node),
                };
                for candidate in candidates {
                    let matched = self.name(candidate).map(|name| step.matches(name)).unwrap_or(false);
                    if matched && seen.insert(candidate) {
                        next.push(candidate);
                    }
                }
            }
            current = next;
        }
        current
    }

    /// Create a detached, empty element written as `<name />`.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: true,
            tail: " ".to_string(),
        }))
    }

    /// Create a detached element carrying a single `Value` attribute.
    pub fn create_value_element(&mut self, name: &str, value: impl fmt::Display) -> NodeId {
        let id = self.create_element(name);
        let raw = escape(value.to_string().as_str()).into_owned();
        if let NodeKind::Element(el) = &mut self.nodes[id.0].kind {
            el.attributes.push(Attribute::new(VALUE_ATTRIBUTE, raw));
        }
        id
    }

    /// Create a detached text node; `raw` must already be escaped.
    pub fn create_text(&mut self, raw: &str) -> NodeId {
        self.alloc(NodeKind::Text(raw.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), XmlError> {
        let index = self.node(parent).children.len();
        self.insert_child(parent, index, child)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), XmlError> {
        self.element_mut(parent)?;
        if self.node(child).parent.is_some() {
            return Err(XmlError::Invalid("node is already attached".into()));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(XmlError::Invalid("cannot insert a node below itself".into()));
        }
        let index = index.min(self.node(parent).children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Insert `node` right after `anchor`, repeating the whitespace that
    /// precedes `anchor` so the new sibling lands on its own, aligned line.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), XmlError> {
        let parent = self
            .node(anchor)
            .parent
            .ok_or_else(|| XmlError::Invalid("anchor is detached".into()))?;
        let index = self.position(parent, anchor) + 1;
        match self.leading_whitespace(anchor) {
            Some(indent) => {
                let text = self.create_text(&indent);
                self.insert_child(parent, index, text)?;
                self.insert_child(parent, index + 1, node)
            }
            None => self.insert_child(parent, index, node),
        }
    }

    /// Append `child` as the last element of `parent`, keeping one element
    /// per line at the indentation of the existing children.
    pub fn append_indented(&mut self, parent: NodeId, child: NodeId) -> Result<(), XmlError> {
        if let Some(last) = self.child_elements(parent).last() {
            return self.insert_after(last, child);
        }
        let outer = self.leading_whitespace(parent).unwrap_or_else(|| "\n".to_string());
        let inner = format!("{outer}\t");
        let closing: Vec<NodeId> = self.node(parent).children.clone();
        for node in closing {
            self.detach(node);
        }
        let open = self.create_text(&inner);
        let close = self.create_text(&outer);
        self.append_child(parent, open)?;
        self.append_child(parent, child)?;
        self.append_child(parent, close)
    }

    /// Insert `child` before the first element of `parent`, on its own line
    /// at the indentation of the existing children.
    pub fn prepend_indented(&mut self, parent: NodeId, child: NodeId) -> Result<(), XmlError> {
        let Some(first) = self.child_elements(parent).next() else {
            return self.append_indented(parent, child);
        };
        let index = self.position(parent, first);
        self.insert_child(parent, index, child)?;
        if let Some(indent) = self.leading_whitespace(child) {
            let text = self.create_text(&indent);
            self.insert_child(parent, index + 1, text)?;
        }
        Ok(())
    }

    /// Detach `id` from its parent. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).parent else {
            return false;
        };
        let index = self.position(parent, id);
        self.nodes[parent.0].children.remove(index);
        self.nodes[id.0].parent = None;
        true
    }

    /// Detach an element together with the whitespace that indents it.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if let Some(parent) = self.node(id).parent {
            let index = self.position(parent, id);
            if index > 0 {
                let before = self.node(parent).children[index - 1];
                if self.is_whitespace(before) {
                    self.detach(before);
                }
            }
        }
        self.detach(id)
    }

    /// Detach every child element of `id`, keeping only the closing
    /// indentation so the element stays well formatted.
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.node(id).children.clone();
        let keep = children.last().copied().filter(|last| self.is_whitespace(*last));
        for child in children {
            if Some(child) != keep {
                self.detach(child);
            }
        }
    }

    /// Copy the subtree rooted at `id` into a new detached subtree.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.node(id).kind.clone();
        let children = self.node(id).children.clone();
        let copy = self.alloc(kind);
        for child in children {
            let cloned = self.deep_clone(child);
            self.attach(copy, cloned);
        }
        copy
    }

    /// Copy a subtree of another document into this one (detached).
    pub fn import(&mut self, other: &Document, id: NodeId) -> NodeId {
        let source = other.node(id);
        let copy = self.alloc(source.kind.clone());
        for &child in &source.children {
            let imported = self.import(other, child);
            self.attach(copy, imported);
        }
        copy
    }

    /// Re-indent a freshly built subtree: each child element on its own line,
    /// one tab deeper than `indent` (which includes the leading newline).
    /// Elements holding anything besides whitespace and elements are left
    /// untouched.
    pub fn indent_subtree(&mut self, id: NodeId, indent: &str) {
        let children: Vec<NodeId> = self.node(id).children.clone();
        let mixed = children
            .iter()
            .any(|child| !self.is_element(*child) && !self.is_whitespace(*child));
        let elements: Vec<NodeId> = children.iter().copied().filter(|c| self.is_element(*c)).collect();
        if mixed || elements.is_empty() {
            return;
        }
        for child in children {
            self.detach(child);
        }
        let inner = format!("{indent}\t");
        for element in elements {
            let text = self.create_text(&inner);
            self.attach(id, text);
            self.attach(id, element);
            self.indent_subtree(element, &inner);
        }
        let close = self.create_text(indent);
        self.attach(id, close);
    }

    /// Whitespace text directly preceding `id`, if any.
    pub fn leading_whitespace(&self, id: NodeId) -> Option<String> {
        let parent = self.node(id).parent?;
        let index = self.position(parent, id);
        let before = *self.node(parent).children.get(index.checked_sub(1)?)?;
        match &self.node(before).kind {
            NodeKind::Text(text) if self.is_whitespace(before) => Some(text.clone()),
            _ => None,
        }
    }

    /// Slash-separated element names from the root down to `id`, for
    /// error messages.
    pub fn describe(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if let Some(name) = self.name(node) {
                names.push(name.to_string());
            }
            cursor = self.node(node).parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Serialize the document back to text.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.nodes.len() * 32);
        if let Some(declaration) = &self.declaration {
            out.push_str(declaration);
        }
        for &child in &self.node(DOCUMENT).children {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a single subtree.
    pub fn subtree_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Document => {}
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attributes {
                    attr.write(out);
                }
                if node.children.is_empty() && el.self_closing {
                    out.push_str(&el.tail);
                    out.push_str("/>");
                } else {
                    // an empty element that gained children is written as `<Tag>`
                    if !el.self_closing {
                        out.push_str(&el.tail);
                    }
                    out.push('>');
                    for &child in &node.children {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(&el.name);
                    out.push('>');
                }
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Pi(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
            NodeKind::DocType(text) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(text);
                out.push('>');
            }
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, XmlError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(XmlError::Invalid("node is not an element".into())),
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn push_leaf(&mut self, parent: NodeId, kind: NodeKind) {
        let id = self.alloc(kind);
        self.attach(parent, id);
    }

    fn position(&self, parent: NodeId, child: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|candidate| *candidate == child)
            .unwrap_or(0)
    }

    fn is_whitespace(&self, id: NodeId) -> bool {
        matches!(&self.node(id).kind, NodeKind::Text(text) if text.chars().all(char::is_whitespace))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == candidate {
                return true;
            }
            cursor = self.node(node).parent;
        }
        false
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

fn split_declaration(text: &str) -> Result<(Option<String>, &str), XmlError> {
    let Some(after) = text.strip_prefix("<?xml") else {
        return Ok((None, text));
    };
    // `<?xml-stylesheet ...?>` is a processing instruction, not a declaration.
    if !after.starts_with(|c: char| c.is_whitespace() || c == '?') {
        return Ok((None, text));
    }
    let end = text
        .find("?>")
        .ok_or_else(|| XmlError::Xml("unterminated XML declaration".into()))?;
    Ok((Some(text[..end + 2].to_string()), &text[end + 2..]))
}

fn element_data(event: &BytesStart<'_>, empty: bool) -> Result<ElementData, XmlError> {
    let name_len = event.name().as_ref().len();
    let name = String::from_utf8_lossy(event.name().as_ref()).into_owned();
    // quick-xml validates (quoting, duplicates); the layout is read from the raw tag
    let checked = event
        .attributes()
        .map(|attr| attr.map(|_| ()))
        .collect::<Result<Vec<()>, _>>()
        .map_err(|err| XmlError::Xml(format!("<{name}>: {err}")))?;
    let content = String::from_utf8_lossy(event);
    let (attributes, tail) = scan_attributes(&content[name_len..])
        .ok_or_else(|| XmlError::Xml(format!("<{name}>: malformed attributes")))?;
    if attributes.len() != checked.len() {
        return Err(XmlError::Xml(format!("<{name}>: malformed attributes")));
    }
    Ok(ElementData {
        name,
        attributes,
        self_closing: empty,
        tail,
    })
}

/// Split the text after a tag name into attributes and the trailing
/// whitespace, keeping every separator and quote as written.
fn scan_attributes(mut rest: &str) -> Option<(Vec<Attribute>, String)> {
    let mut attributes = Vec::new();
    loop {
        let key_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        let (leading, after) = rest.split_at(key_start);
        if after.is_empty() {
            return Some((attributes, leading.to_string()));
        }
        let key_end = after.find(|c: char| c.is_whitespace() || c == '=')?;
        let (key, after) = after.split_at(key_end);
        let quote_at = after.find(|c: char| c == '"' || c == '\'')?;
        let (equals, after) = after.split_at(quote_at);
        if equals.trim() != "=" {
            return None;
        }
        let quote = after.chars().next()?;
        let value = &after[1..];
        let value_end = value.find(quote)?;
        attributes.push(Attribute {
            leading: leading.to_string(),
            key: key.to_string(),
            equals: equals.to_string(),
            quote,
            raw: value[..value_end].to_string(),
        });
        rest = &value[value_end + 1..];
    }
}

fn raw_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RACK: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Ableton MajorVersion=\"5\" Creator=\"Ableton Live 12.0\">\n\t<GroupDevicePreset>\n\t\t<BranchPresets>\n\t\t\t<DrumBranchPreset Id=\"0\">\n\t\t\t\t<Name Value=\"Kick &amp; Sub\" />\n\t\t\t\t<ZoneSettings>\n\t\t\t\t\t<ReceivingNote Value=\"92\" />\n\t\t\t\t</ZoneSettings>\n\t\t\t</DrumBranchPreset>\n\t\t\t<DrumBranchPreset Id=\"1\">\n\t\t\t\t<Name Value=\"Snare\"/>\n\t\t\t\t<ZoneSettings>\n\t\t\t\t\t<ReceivingNote Value=\"91\" />\n\t\t\t\t</ZoneSettings>\n\t\t\t</DrumBranchPreset>\n\t\t</BranchPresets>\n\t\t<!-- trailing comment -->\n\t\t<Annotation></Annotation>\n\t</GroupDevicePreset>\n</Ableton>\n";

    #[test]
    fn roundtrip_is_exact() {
        let doc = Document::parse(RACK).expect("parse");
        assert_eq!(doc.to_xml(), RACK);
        assert_eq!(
            doc.declaration(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert_eq!(doc.name(doc.root()), Some("Ableton"));
    }

    #[test]
    fn roundtrip_keeps_cdata_pi_and_missing_declaration() {
        let text = "<a><?keep me?><![CDATA[<raw>]]><b x='1'/></a>";
        let doc = Document::parse(text).expect("parse");
        assert_eq!(doc.to_xml(), text);
        assert!(doc.declaration().is_none());
    }

    #[test]
    fn roundtrip_keeps_attribute_spelling() {
        let text = "<?xml version=\"1.0\"?>\n<Ableton MajorVersion='5'  MinorVersion=\"11\"\n\tCreator = 'Live \"12\"' >\n\t<Name Value='a&amp;b'\t/>\n</Ableton>";
        let mut doc = Document::parse(text).expect("parse");
        assert_eq!(doc.to_xml(), text);
        let root = doc.root();
        assert_eq!(doc.attribute(root, "Creator").as_deref(), Some("Live \"12\""));

        let name = doc.child_element(root, "Name").expect("name");
        assert_eq!(doc.value(name).as_deref(), Some("a&b"));
        doc.set_value(name, "c").expect("set");
        assert!(doc.to_xml().contains("<Name Value='c'\t/>"));
    }

    #[test]
    fn attributes_are_unescaped_and_escaped() {
        let mut doc = Document::parse(RACK).expect("parse");
        let name = doc.select_first(doc.root(), ".//Name").expect("path").expect("name");
        assert_eq!(doc.value(name).as_deref(), Some("Kick & Sub"));
        doc.set_value(name, "Tom <Low>").expect("set");
        assert_eq!(doc.value(name).as_deref(), Some("Tom <Low>"));
        assert!(doc.to_xml().contains("<Name Value=\"Tom &lt;Low&gt;\" />"));
    }

    #[test]
    fn set_attribute_keeps_order_and_appends_new_keys() {
        let mut doc = Document::parse("<a x=\"1\" y=\"2\"/>").expect("parse");
        let root = doc.root();
        doc.set_attribute(root, "x", "9").expect("set");
        doc.set_attribute(root, "z", "3").expect("set");
        assert_eq!(doc.to_xml(), "<a x=\"9\" y=\"2\" z=\"3\"/>");
        assert!(doc.remove_attribute(root, "y").expect("remove"));
        assert_eq!(doc.to_xml(), "<a x=\"9\" z=\"3\"/>");
    }

    #[test]
    fn select_supports_descendant_and_wildcard_steps() {
        let doc = Document::parse(RACK).expect("parse");
        let root = doc.root();
        let notes = doc.select(root, ".//ZoneSettings/ReceivingNote").expect("select");
        let values: Vec<String> = notes.iter().filter_map(|id| doc.value(*id)).collect();
        assert_eq!(values, vec!["92", "91"]);

        let pads = doc.select(root, "GroupDevicePreset/BranchPresets/*").expect("select");
        assert_eq!(pads.len(), 2);
        let pads_deep = doc.select(root, "GroupDevicePreset//DrumBranchPreset").expect("select");
        assert_eq!(pads, pads_deep);
        assert_eq!(doc.select(root, ".").expect("select"), vec![root]);
        assert!(doc.select(root, ".//Missing").expect("select").is_empty());
        assert!(doc.select(root, "A//").is_err());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(Document::parse("<a><b></a>"), Err(XmlError::Xml(_))));
        assert!(matches!(Document::parse("<a>"), Err(XmlError::Xml(_))));
        assert!(matches!(Document::parse("<a/><b/>"), Err(XmlError::Invalid(_))));
        assert!(matches!(Document::parse("   "), Err(XmlError::Invalid(_))));
    }

    #[test]
    fn insert_after_copies_indentation() {
        let mut doc = Document::parse(RACK).expect("parse");
        let name = doc.select_first(doc.root(), ".//Name").expect("path").expect("name");
        let color = doc.create_value_element("DocumentColorIndex", 60);
        doc.insert_after(name, color).expect("insert");
        assert!(doc.to_xml().contains(
            "<Name Value=\"Kick &amp; Sub\" />\n\t\t\t\t<DocumentColorIndex Value=\"60\" />\n\t\t\t\t<ZoneSettings>"
        ));
    }

    #[test]
    fn remove_drops_indentation_with_the_element() {
        let mut doc = Document::parse(RACK).expect("parse");
        let pads = doc.select(doc.root(), ".//DrumBranchPreset").expect("select");
        assert!(doc.remove(pads[1]));
        let xml = doc.to_xml();
        assert!(xml.contains("</DrumBranchPreset>\n\t\t</BranchPresets>"));
        assert_eq!(xml.matches("<DrumBranchPreset").count(), 1);
        assert!(!doc.remove(pads[1]));
        assert!(!doc.is_attached(pads[1]));
        assert!(doc.is_attached(pads[0]));
    }

    #[test]
    fn clear_then_append_indented_rebuilds_container() {
        let mut doc = Document::parse(RACK).expect("parse");
        let container = doc.select_first(doc.root(), ".//BranchPresets").expect("path").expect("container");
        let template = doc.select_first(container, "DrumBranchPreset").expect("path").expect("pad");
        let copy = doc.deep_clone(template);
        doc.clear_children(container);
        doc.append_indented(container, copy).expect("append");
        let xml = doc.to_xml();
        assert!(xml.contains("<BranchPresets>\n\t\t\t<DrumBranchPreset Id=\"0\">"));
        assert!(xml.contains("</DrumBranchPreset>\n\t\t</BranchPresets>"));
        assert_eq!(xml.matches("<DrumBranchPreset").count(), 1);
    }

    #[test]
    fn append_indented_into_empty_element() {
        let mut doc = Document::parse("<a>\n\t<List />\n</a>").expect("parse");
        let list = doc.child_element(doc.root(), "List").expect("list");
        let item = doc.create_value_element("Item", 1);
        doc.append_indented(list, item).expect("append");
        assert_eq!(
            doc.to_xml(),
            "<a>\n\t<List>\n\t\t<Item Value=\"1\" />\n\t</List>\n</a>"
        );
    }

    #[test]
    fn prepend_indented_puts_element_first() {
        let mut doc = Document::parse("<a>\n\t<List>\n\t\t<Item Value=\"1\" />\n\t</List>\n</a>").expect("parse");
        let list = doc.child_element(doc.root(), "List").expect("list");
        let item = doc.create_value_element("Item", 0);
        doc.prepend_indented(list, item).expect("prepend");
        assert_eq!(
            doc.to_xml(),
            "<a>\n\t<List>\n\t\t<Item Value=\"0\" />\n\t\t<Item Value=\"1\" />\n\t</List>\n</a>"
        );

        let mut doc = Document::parse("<a>\n\t<List />\n</a>").expect("parse");
        let list = doc.child_element(doc.root(), "List").expect("list");
        let item = doc.create_value_element("Item", 0);
        doc.prepend_indented(list, item).expect("prepend");
        assert_eq!(doc.to_xml(), "<a>\n\t<List>\n\t\t<Item Value=\"0\" />\n\t</List>\n</a>");
    }

    #[test]
    fn deep_clone_is_independent() {
        let mut doc = Document::parse(RACK).expect("parse");
        let pad = doc.select_first(doc.root(), ".//DrumBranchPreset").expect("path").expect("pad");
        let copy = doc.deep_clone(pad);
        let note = doc.select_first(copy, ".//ReceivingNote").expect("path").expect("note");
        doc.set_value(note, 12).expect("set");
        assert_eq!(doc.to_xml(), RACK);
        assert!(doc.subtree_xml(copy).contains("<ReceivingNote Value=\"12\" />"));
    }

    #[test]
    fn import_and_indent_fragment() {
        let fragment = Document::parse("<KeyMidi><Channel Value=\"16\" /><IsNote Value=\"false\" /></KeyMidi>")
            .expect("parse");
        let mut doc = Document::parse("<Param>\n\t<LomId Value=\"0\" />\n</Param>").expect("parse");
        let lom = doc.child_element(doc.root(), "LomId").expect("lom");
        let key = doc.import(&fragment, fragment.root());
        doc.indent_subtree(key, "\n\t");
        doc.insert_after(lom, key).expect("insert");
        assert_eq!(
            doc.to_xml(),
            "<Param>\n\t<LomId Value=\"0\" />\n\t<KeyMidi>\n\t\t<Channel Value=\"16\" />\n\t\t<IsNote Value=\"false\" />\n\t</KeyMidi>\n</Param>"
        );
    }

    #[test]
    fn describe_names_the_element_path() {
        let doc = Document::parse(RACK).expect("parse");
        let note = doc.select_first(doc.root(), ".//ReceivingNote").expect("path").expect("note");
        assert_eq!(
            doc.describe(note),
            "Ableton/GroupDevicePreset/BranchPresets/DrumBranchPreset/ZoneSettings/ReceivingNote"
        );
    }

    #[test]
    fn refuses_cycles_and_double_attachment() {
        let mut doc = Document::parse("<a><b/></a>").expect("parse");
        let root = doc.root();
        let b = doc.child_element(root, "b").expect("b");
        assert!(doc.append_child(b, root).is_err());
        assert!(doc.append_child(root, b).is_err());
    }
}
