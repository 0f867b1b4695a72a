//! Portable markup model: a node tree, an HTML parser, a serializer and a
//! small selector engine. Paths (`NodePath`) address nodes by child index from
//! the document root and stay valid until the tree above them changes.

pub mod node;
pub mod parser;
pub mod selector;

pub use node::{Element, Node};
pub use selector::Selector;

use crate::utils::error::Result;
use std::fmt;

pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    children: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self {
            children: parser::parse_fragment(html)?,
        })
    }

    pub fn from_nodes(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodePath>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(&selector).into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodePath>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(&selector))
    }

    /// All matching elements in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        collect_matches(&self.children, selector, &mut path, &mut found);
        found
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodePath> {
        let mut path = Vec::new();
        find_by_id(&self.children, id, &mut path)
    }

    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut element = self.children.get(*first)?.as_element()?;
        for index in rest {
            element = element.children.get(*index)?.as_element()?;
        }
        Some(element)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut element = self.children.get_mut(*first)?.as_element_mut()?;
        for index in rest {
            element = element.children.get_mut(*index)?.as_element_mut()?;
        }
        Some(element)
    }

    /// Replaces every child of the element at `path`. Returns false, leaving
    /// the tree untouched, when no element lives there.
    pub fn replace_children(&mut self, path: &[usize], nodes: Vec<Node>) -> bool {
        match self.element_mut(path) {
            Some(element) => {
                element.children = nodes;
                true
            }
            None => false,
        }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        node::write_html(&self.children, &mut out);
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn collect_matches(
    nodes: &[Node],
    selector: &Selector,
    path: &mut NodePath,
    found: &mut Vec<NodePath>,
) {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(element) = node {
            path.push(index);
            if selector.matches(element) {
                found.push(path.clone());
            }
            collect_matches(&element.children, selector, path, found);
            path.pop();
        }
    }
}

fn find_by_id(nodes: &[Node], id: &str, path: &mut NodePath) -> Option<NodePath> {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(element) = node {
            path.push(index);
            if element.id() == Some(id) {
                return Some(path.clone());
            }
            if let Some(found) = find_by_id(&element.children, id, path) {
                return Some(found);
            }
            path.pop();
        }
    }
    None
}
