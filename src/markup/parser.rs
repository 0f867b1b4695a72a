use crate::markup::node::{is_raw_text_tag, is_void_tag, Element, Node};
use crate::utils::error::{Result, SiteError};

/// Parses a markup fragment or a whole page into a node list.
///
/// Tolerant in the way browsers are for hand-written pages: stray end tags are
/// dropped and elements left open at the end of input are closed. Unclosed
/// comments and tags are errors.
pub fn parse_fragment(html: &str) -> Result<Vec<Node>> {
    let bytes = html.as_bytes();
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| SiteError::markup("unclosed HTML comment"))?;
            push_node(&mut roots, &mut stack, Node::Comment(html[i + 4..end].to_string()));
            i = end + 3;
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            let end = find_subslice(bytes, i + 2, b">")
                .ok_or_else(|| SiteError::markup("unclosed declaration"))?;
            push_node(&mut roots, &mut stack, Node::Doctype(html[i + 2..end].to_string()));
            i = end + 1;
            continue;
        }

        if starts_with_at(bytes, i, b"</") {
            let (tag, next) = parse_end_tag(html, i)?;
            i = next;
            close_element(&mut roots, &mut stack, &tag);
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
            let (element, self_closing, next) = parse_start_tag(html, i)?;
            i = next;
            close_implied(&mut roots, &mut stack, &element.tag);

            if is_raw_text_tag(&element.tag) {
                let close = find_end_tag(bytes, i, element.tag.as_bytes())
                    .ok_or_else(|| SiteError::markup(format!("unclosed <{}>", element.tag)))?;
                let mut element = element;
                if close > i {
                    element.children.push(Node::Text(html[i..close].to_string()));
                }
                let (_, after_end) = parse_end_tag(html, close)?;
                i = after_end;
                push_node(&mut roots, &mut stack, Node::Element(element));
                continue;
            }

            if self_closing || is_void_tag(&element.tag) {
                push_node(&mut roots, &mut stack, Node::Element(element));
            } else {
                stack.push(element);
            }
            continue;
        }

        // 文字節點：直到下一個標籤開頭
        let text_start = i;
        i += 1;
        while i < bytes.len() && !is_tag_open(bytes, i) {
            i += 1;
        }
        let text = decode_entities(&html[text_start..i]);
        push_node(&mut roots, &mut stack, Node::Text(text));
    }

    while let Some(element) = stack.pop() {
        push_node(&mut roots, &mut stack, Node::Element(element));
    }

    Ok(roots)
}

fn is_tag_open(bytes: &[u8], i: usize) -> bool {
    if bytes[i] != b'<' {
        return false;
    }
    match bytes.get(i + 1) {
        Some(b) => b.is_ascii_alphabetic() || *b == b'/' || *b == b'!',
        None => false,
    }
}

fn push_node(roots: &mut Vec<Node>, stack: &mut [Element], node: Node) {
    match stack.last_mut() {
        Some(parent) => {
            // 相鄰文字合併成一個節點
            if let (Node::Text(text), Some(Node::Text(prev))) = (&node, parent.children.last_mut()) {
                prev.push_str(text);
                return;
            }
            parent.children.push(node);
        }
        None => {
            if let (Node::Text(text), Some(Node::Text(prev))) = (&node, roots.last_mut()) {
                prev.push_str(text);
                return;
            }
            roots.push(node);
        }
    }
}

fn close_element(roots: &mut Vec<Node>, stack: &mut Vec<Element>, tag: &str) {
    let Some(position) = stack.iter().rposition(|e| e.tag.eq_ignore_ascii_case(tag)) else {
        tracing::debug!("Ignoring stray end tag </{}>", tag);
        return;
    };
    while stack.len() > position {
        if let Some(element) = stack.pop() {
            push_node(roots, stack, Node::Element(element));
        }
    }
}

// 開始標籤隱含的結束：li、dt/dd、option 關閉前一個同類，區塊元素關閉開著的 p
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

const P_SCOPE_BOUNDARY: &[&str] = &["button", "caption", "html", "object", "table", "td", "th"];

fn close_implied(roots: &mut Vec<Node>, stack: &mut Vec<Element>, tag: &str) {
    let (target, boundary): (&[&str], &[&str]) = match tag {
        "li" => (&["li"], &["ul", "ol", "menu"]),
        "dt" | "dd" => (&["dt", "dd"], &["dl"]),
        "option" => (&["option"], &["select", "datalist", "optgroup"]),
        t if CLOSES_P.contains(&t) => (&["p"], P_SCOPE_BOUNDARY),
        _ => return,
    };

    let open = stack
        .iter()
        .rev()
        .take_while(|e| !boundary.contains(&e.tag.as_str()))
        .find(|e| target.contains(&e.tag.as_str()))
        .map(|e| e.tag.clone());
    if let Some(open) = open {
        close_element(roots, stack, &open);
    }
}

fn parse_start_tag(html: &str, at: usize) -> Result<(Element, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(SiteError::markup("empty tag name"));
    }

    let mut element = Element::new(tag);
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(SiteError::markup(format!("unclosed start tag <{}", element.tag)));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' {
            i += 1;
            if bytes.get(i) == Some(&b'>') {
                self_closing = true;
                i += 1;
                break;
            }
            continue;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if name_start == i {
            return Err(SiteError::markup(format!(
                "invalid attribute in <{}>",
                element.tag
            )));
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        // 重複屬性以第一個為準
        if element.attr(&name).is_none() {
            element.attrs.push((name, value));
        }
    }

    Ok((element, self_closing, i))
}

fn parse_attr_value(html: &str, i: &mut usize) -> Result<String> {
    let bytes = html.as_bytes();
    match bytes.get(*i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let start = *i + 1;
            let end = find_subslice(bytes, start, &[quote])
                .ok_or_else(|| SiteError::markup("unclosed attribute value"))?;
            *i = end + 1;
            Ok(decode_entities(&html[start..end]))
        }
        _ => {
            let start = *i;
            while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            Ok(decode_entities(&html[start..*i]))
        }
    }
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    let end = find_subslice(bytes, i, b">")
        .ok_or_else(|| SiteError::markup(format!("unclosed end tag </{}", tag)))?;
    Ok((tag, end + 1))
}

fn find_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + 2 + tag.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.len() >= at + needle.len() && &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|p| p + from)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'"' | b'\'' | b'>' | b'/' | b'=')
}

/// Decodes character references, including the full HTML5 named set.
/// Text that is not a known reference is kept as written.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_and_text() {
        let nodes = parse_fragment(r#"<nav id="navbar"><a class="nav-link" href="/">Home</a></nav>"#)
            .unwrap();
        assert_eq!(nodes.len(), 1);

        let nav = nodes[0].as_element().unwrap();
        assert_eq!(nav.tag, "nav");
        assert_eq!(nav.id(), Some("navbar"));
        let link = nav.children[0].as_element().unwrap();
        assert_eq!(link.attr("href"), Some("/"));
        assert_eq!(link.text_content(), "Home");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let nodes = parse_fragment(r#"<p>a<br>b<img src="x.png"/>c</p>"#).unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.children.len(), 5);
        assert_eq!(p.text_content(), "abc");
    }

    #[test]
    fn test_doctype_comment_and_script() {
        let html = "<!DOCTYPE html><!-- note --><script>if (a<b) {}</script>";
        let nodes = parse_fragment(html).unwrap();
        assert_eq!(nodes[0], Node::Doctype("DOCTYPE html".to_string()));
        assert_eq!(nodes[1], Node::Comment(" note ".to_string()));
        assert_eq!(nodes[2].text_content(), "if (a<b) {}");
    }

    #[test]
    fn test_entities_are_decoded() {
        let nodes = parse_fragment("<p title=\"&quot;x&quot;\">Tom &amp; Jerry &copy; &#65;&#x42; &bogus;</p>").unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.attr("title"), Some("\"x\""));
        assert_eq!(p.text_content(), "Tom & Jerry © AB &bogus;");
    }

    #[test]
    fn test_html5_named_references() {
        assert_eq!(decode_entities("&rarr; &times; &euro; &laquo;&raquo;"), "→ × € «»");
        assert_eq!(decode_entities("no refs"), "no refs");
    }

    #[test]
    fn test_stray_end_tags_and_unclosed_elements() {
        let nodes = parse_fragment("<div><span>x</p></div><section>open").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "x");
        assert_eq!(nodes[1].as_element().unwrap().tag, "section");
        assert_eq!(nodes[1].text_content(), "open");
    }

    #[test]
    fn test_implied_end_tags() {
        let nodes = parse_fragment("<ul><li>a<li>b</ul>").unwrap();
        let ul = nodes[0].as_element().unwrap();
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.children[1].text_content(), "b");

        let nodes = parse_fragment("<p>a<div>b</div>").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].as_element().unwrap().tag, "div");

        let nodes =
            parse_fragment("<select><option>x<option selected>y</select>").unwrap();
        assert_eq!(nodes[0].as_element().unwrap().children.len(), 2);

        // 巢狀清單不會關閉外層的 li
        let nodes = parse_fragment("<ul><li>a<ul><li>b<li>c</ul></ul>").unwrap();
        let outer = nodes[0].as_element().unwrap();
        assert_eq!(outer.children.len(), 1);
        let inner = outer.children[0].as_element().unwrap().children[1]
            .as_element()
            .unwrap();
        assert_eq!(inner.children.len(), 2);
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let nodes = parse_fragment("<p>1 < 2</p>").unwrap();
        assert_eq!(nodes[0].text_content(), "1 < 2");
    }

    #[test]
    fn test_unclosed_comment_is_error() {
        assert!(parse_fragment("<div><!-- oops</div>").is_err());
        assert!(parse_fragment("<div class=\"a").is_err());
    }
}
