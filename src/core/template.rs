use crate::domain::model::PropertyMap;
use crate::markup::node::{for_each_text_mut, Node};
use crate::markup::parser::parse_fragment;
use crate::utils::error::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// 已解析的片段，載入後不再變動；渲染時只處理複本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentTemplate {
    name: String,
    nodes: Vec<Node>,
}

impl FragmentTemplate {
    pub fn parse(name: &str, markup: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            nodes: parse_fragment(markup.trim())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// A substituted copy of the template content, ready to be mounted.
    pub fn instantiate(&self, properties: &PropertyMap) -> Vec<Node> {
        let mut clone = self.nodes.clone();
        substitute(&mut clone, properties);
        clone
    }
}

/// Replaces `{{key}}` in every text node with `properties[key]`.
///
/// Case-sensitive and single pass: inserted values are never scanned again.
/// Unknown keys and attribute values are left exactly as written.
pub fn substitute(nodes: &mut [Node], properties: &PropertyMap) {
    if properties.is_empty() {
        return;
    }
    for_each_text_mut(nodes, &mut |text: &mut String| {
        if !text.contains("{{") {
            return;
        }
        let replaced = substitute_text(text, properties);
        *text = replaced;
    });
}

pub fn substitute_text(text: &str, properties: &PropertyMap) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match properties.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
