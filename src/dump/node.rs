use std::collections::BTreeMap;

/// Body of a [`DumpNode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    /// Self-closing element
    Empty,
    /// Text body, e.g. `null` markers and event payloads
    Text(String),
    /// Nested elements, in order
    Children(Vec<DumpNode>),
}

/// One element of a dump: a name, alphabetically ordered attributes and a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpNode {
    name: String,
    attributes: BTreeMap<String, String>,
    content: NodeContent,
}

impl DumpNode {
    /// An empty element
    #[must_use]
    pub fn new(name: &str) -> Self {
        DumpNode {
            name: name.to_string(),
            attributes: BTreeMap::new(),
            content: NodeContent::Empty,
        }
    }

    /// An element with a text body
    #[must_use]
    pub fn text(name: &str, text: &str) -> Self {
        DumpNode {
            content: NodeContent::Text(text.to_string()),
            ..DumpNode::new(name)
        }
    }

    /// An element wrapping a single child
    #[must_use]
    pub fn wrap(name: &str, child: DumpNode) -> Self {
        DumpNode::new(name).with_children(vec![child])
    }

    /// Set an attribute, replacing an earlier value
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set an attribute, replacing an earlier value
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Replace the body by the given children
    #[must_use]
    pub fn with_children(mut self, children: Vec<DumpNode>) -> Self {
        self.content = NodeContent::Children(children);
        self
    }

    /// Append a child, turning an empty or text body into a list of children
    pub fn push(&mut self, child: DumpNode) {
        match &mut self.content {
            NodeContent::Children(children) => children.push(child),
            content => *content = NodeContent::Children(vec![child]),
        }
    }

    /// The element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attributes, ordered by name
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// The value of an attribute
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The body
    #[must_use]
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// The child elements; empty for text and empty bodies
    #[must_use]
    pub fn children(&self) -> &[DumpNode] {
        match &self.content {
            NodeContent::Children(children) => children,
            _ => &[],
        }
    }

    /// The first child element with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&DumpNode> {
        self.children().iter().find(|child| child.name == name)
    }

    /// The text body, if there is one
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Turns a dump label into a tag name.
///
/// Spaces and characters that are not valid in a tag become underscores, as do dots unless
/// `keep_dots` is set. Labels that do not start with a letter or underscore get a leading
/// underscore.
#[must_use]
pub fn tag_name(label: &str, keep_dots: bool) -> String {
    let mut tag: String = label
        .chars()
        .map(|c| match c {
            '.' if keep_dots => '.',
            '-' | '_' => c,
            c if c.is_alphanumeric() => c,
            _ => '_',
        })
        .collect();

    if !tag.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        tag.insert(0, '_');
    }

    tag
}
