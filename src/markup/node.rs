/// Elements that never have children or an end tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is kept verbatim by the parser and serializer.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attrs
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().contains(&class_name)
    }

    pub fn add_class(&mut self, class_name: &str) {
        if self.has_class(class_name) {
            return;
        }
        let mut classes: Vec<String> = self.classes().into_iter().map(String::from).collect();
        classes.push(class_name.to_string());
        self.set_classes(&classes);
    }

    pub fn remove_class(&mut self, class_name: &str) {
        if !self.has_class(class_name) {
            return;
        }
        let classes: Vec<String> = self
            .classes()
            .into_iter()
            .filter(|c| *c != class_name)
            .map(String::from)
            .collect();
        self.set_classes(&classes);
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, class_name: &str) -> bool {
        if self.has_class(class_name) {
            self.remove_class(class_name);
            false
        } else {
            self.add_class(class_name);
            true
        }
    }

    fn set_classes(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &classes.join(" "));
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Node::Comment(_) | Node::Doctype(_) => {}
        }
    }
}

/// Visits every text node below `nodes` in document order.
pub fn for_each_text_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut String),
{
    for node in nodes {
        match node {
            Node::Text(text) => f(text),
            Node::Element(element) => for_each_text_mut(&mut element.children, f),
            Node::Comment(_) | Node::Doctype(_) => {}
        }
    }
}

pub fn write_html(nodes: &[Node], out: &mut String) {
    for node in nodes {
        write_node(node, false, out);
    }
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_text(text, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Doctype(doctype) => {
            out.push_str("<!");
            out.push_str(doctype);
            out.push('>');
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_tag(&element.tag) {
                return;
            }
            let raw = is_raw_text_tag(&element.tag);
            for child in &element.children {
                write_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_operations() {
        let mut link = Element::new("a").with_attr("class", "nav-link");
        link.add_class("active");
        assert_eq!(link.attr("class"), Some("nav-link active"));
        link.add_class("active");
        assert_eq!(link.classes(), vec!["nav-link", "active"]);

        assert!(!link.toggle_class("active"));
        assert_eq!(link.attr("class"), Some("nav-link"));

        link.remove_class("nav-link");
        assert_eq!(link.attr("class"), None);
    }

    #[test]
    fn test_write_html_escapes_text_but_not_scripts() {
        let nodes = vec![
            Node::Element(
                Element::new("p")
                    .with_attr("title", "a \"b\"")
                    .with_child(Node::text("1 < 2 & 3")),
            ),
            Node::Element(Element::new("script").with_child(Node::text("if (a < b) {}"))),
            Node::Element(Element::new("br")),
        ];
        let mut out = String::new();
        write_html(&nodes, &mut out);
        assert_eq!(
            out,
            "<p title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</p><script>if (a < b) {}</script><br>"
        );
    }

    #[test]
    fn test_for_each_text_mut_skips_attributes_and_comments() {
        let mut nodes = vec![Node::Element(
            Element::new("div")
                .with_attr("title", "x")
                .with_child(Node::Comment("x".to_string()))
                .with_child(Node::text("x")),
        )];
        for_each_text_mut(&mut nodes, &mut |text: &mut String| text.push('!'));

        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.attr("title"), Some("x"));
        assert_eq!(div.children[0], Node::Comment("x".to_string()));
        assert_eq!(div.text_content(), "x!");
    }
}
