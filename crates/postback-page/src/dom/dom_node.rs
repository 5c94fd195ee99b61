//! Tree node types and path-based navigation.

/// Child indices from the document root to an element.
pub type NodePath = Vec<usize>;

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An element with its attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name (lowercase).
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn append(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            _ => {}
        }
    }
}

/// A whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    /// Paths of every element matching `predicate`, in document order.
    pub fn find_all(&self, predicate: impl Fn(&Element) -> bool) -> Vec<NodePath> {
        let mut out = Vec::new();
        collect_paths(&self.children, &mut Vec::new(), &predicate, &mut out);
        out
    }

    /// Paths of the descendants of the element at `root` matching
    /// `predicate`, in document order.
    pub fn find_within(
        &self,
        root: &[usize],
        predicate: impl Fn(&Element) -> bool,
    ) -> Vec<NodePath> {
        let mut out = Vec::new();
        if let Some(element) = self.element(root) {
            let mut prefix = root.to_vec();
            collect_paths(&element.children, &mut prefix, &predicate, &mut out);
        }
        out
    }

    /// Path of the first element matching `predicate`.
    pub fn find_first(&self, predicate: impl Fn(&Element) -> bool) -> Option<NodePath> {
        self.find_all(predicate).into_iter().next()
    }

    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let (last, parents) = path.split_last()?;
        let mut nodes = &self.children;
        for index in parents {
            nodes = &nodes.get(*index)?.as_element()?.children;
        }
        nodes.get(*last)?.as_element()
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        element_at_mut(&mut self.children, path)
    }
}

fn collect_paths(
    nodes: &[Node],
    prefix: &mut NodePath,
    predicate: &dyn Fn(&Element) -> bool,
    out: &mut Vec<NodePath>,
) {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(element) = node {
            prefix.push(index);
            if predicate(element) {
                out.push(prefix.clone());
            }
            collect_paths(&element.children, prefix, predicate, out);
            prefix.pop();
        }
    }
}

fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    let (first, rest) = path.split_first()?;
    let Node::Element(element) = nodes.get_mut(*first)? else {
        return None;
    };
    if rest.is_empty() {
        Some(element)
    } else {
        element_at_mut(&mut element.children, rest)
    }
}
