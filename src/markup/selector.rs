use crate::markup::node::Element;
use crate::utils::error::{Result, SiteError};

/// A group of compound selectors (`a, b`). Combinators are not supported:
/// mount points and behavior targets are always addressed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Word(String),
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let mut groups = Vec::new();
        for part in split_groups(selector) {
            let part = part.trim();
            if part.is_empty() {
                return Err(SiteError::selector(selector, "empty selector"));
            }
            groups.push(parse_compound(selector, part)?);
        }
        Ok(Self { groups })
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.groups.iter().any(|compound| compound.matches(element))
    }
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|cond| {
            let Some(value) = element.attr(&cond.name) else {
                return false;
            };
            match &cond.op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == expected,
                AttrOp::Prefix(prefix) => value.starts_with(prefix.as_str()),
                AttrOp::Suffix(suffix) => value.ends_with(suffix.as_str()),
                AttrOp::Contains(needle) => value.contains(needle.as_str()),
                AttrOp::Word(word) => value.split_whitespace().any(|w| w == word),
            }
        })
    }
}

// 逗號分組，忽略引號與中括號內的逗號
fn split_groups(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, c) in selector.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn parse_compound(full: &str, part: &str) -> Result<Compound> {
    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0usize;

    if chars[0] == '*' {
        i += 1;
    } else if is_ident_char(chars[0]) {
        let tag = read_ident(&chars, &mut i);
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = read_ident(&chars, &mut i);
                if id.is_empty() {
                    return Err(SiteError::selector(full, "expected an id after '#'"));
                }
                compound.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = read_ident(&chars, &mut i);
                if class.is_empty() {
                    return Err(SiteError::selector(full, "expected a class after '.'"));
                }
                compound.classes.push(class);
            }
            '[' => {
                i += 1;
                compound.attrs.push(parse_attr_condition(full, &chars, &mut i)?);
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                return Err(SiteError::selector(full, "combinators are not supported"));
            }
            c => {
                return Err(SiteError::selector(full, format!("unexpected character '{}'", c)));
            }
        }
    }

    Ok(compound)
}

fn parse_attr_condition(full: &str, chars: &[char], i: &mut usize) -> Result<AttrCondition> {
    skip_ws(chars, i);
    let name = read_ident(chars, i).to_ascii_lowercase();
    if name.is_empty() {
        return Err(SiteError::selector(full, "expected an attribute name"));
    }
    skip_ws(chars, i);

    let op_prefix = match chars.get(*i) {
        Some(']') => {
            *i += 1;
            return Ok(AttrCondition {
                name,
                op: AttrOp::Exists,
            });
        }
        Some('=') => None,
        Some(c @ ('^' | '$' | '*' | '~')) if chars.get(*i + 1) == Some(&'=') => {
            *i += 1;
            Some(*c)
        }
        _ => return Err(SiteError::selector(full, "malformed attribute selector")),
    };
    *i += 1;
    skip_ws(chars, i);

    let value = match chars.get(*i) {
        Some(&q) if q == '"' || q == '\'' => {
            *i += 1;
            let start = *i;
            while *i < chars.len() && chars[*i] != q {
                *i += 1;
            }
            if *i >= chars.len() {
                return Err(SiteError::selector(full, "unclosed attribute value"));
            }
            let value: String = chars[start..*i].iter().collect();
            *i += 1;
            value
        }
        _ => read_ident(chars, i),
    };

    skip_ws(chars, i);
    if chars.get(*i) != Some(&']') {
        return Err(SiteError::selector(full, "expected ']'"));
    }
    *i += 1;

    let op = match op_prefix {
        None => AttrOp::Equals(value),
        Some('^') => AttrOp::Prefix(value),
        Some('$') => AttrOp::Suffix(value),
        Some('*') => AttrOp::Contains(value),
        Some(_) => AttrOp::Word(value),
    };
    Ok(AttrCondition { name, op })
}

fn read_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && is_ident_char(chars[*i]) {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn skip_ws(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str) -> Element {
        Element::new("a")
            .with_attr("class", "nav-link active")
            .with_attr("href", href)
            .with_attr("data-page", "about")
    }

    #[test]
    fn test_id_class_and_tag() {
        let el = Element::new("div").with_attr("id", "hero-container");
        assert!(Selector::parse("#hero-container").unwrap().matches(&el));
        assert!(Selector::parse("div#hero-container").unwrap().matches(&el));
        assert!(!Selector::parse("section#hero-container").unwrap().matches(&el));

        let a = link("/about.html");
        assert!(Selector::parse(".nav-link").unwrap().matches(&a));
        assert!(Selector::parse("a.nav-link.active").unwrap().matches(&a));
        assert!(!Selector::parse(".nav-link.disabled").unwrap().matches(&a));
    }

    #[test]
    fn test_attribute_operators() {
        let anchor = link("#services");
        assert!(Selector::parse("a[href^=\"#\"]").unwrap().matches(&anchor));
        assert!(!Selector::parse("a[href^=\"#\"]").unwrap().matches(&link("/about")));
        assert!(Selector::parse("[data-page=about]").unwrap().matches(&anchor));
        assert!(Selector::parse("[data-page]").unwrap().matches(&anchor));
        assert!(Selector::parse("[href$=services]").unwrap().matches(&anchor));
        assert!(Selector::parse("[class~=active]").unwrap().matches(&anchor));
        assert!(Selector::parse("[href*='serv']").unwrap().matches(&anchor));
    }

    #[test]
    fn test_groups() {
        let selector = Selector::parse("#nav-menu, #mobile-menu").unwrap();
        assert!(selector.matches(&Element::new("ul").with_attr("id", "nav-menu")));
        assert!(selector.matches(&Element::new("div").with_attr("id", "mobile-menu")));
        assert!(!selector.matches(&Element::new("div").with_attr("id", "navbar")));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("#").is_err());
        assert!(Selector::parse("nav a").is_err());
        assert!(Selector::parse("a[href").is_err());
        assert!(Selector::parse("a,").is_err());
    }
}
