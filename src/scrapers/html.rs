//! Tolerant HTML scanning helpers.
//!
//! Just enough to read the sector pages: case-insensitive tag matching,
//! nesting-aware element bounds, attribute lookup and text extraction.
//! Unclosed elements run to the end of the input instead of failing.

/// An element's opening tag and the markup between it and its closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub open_tag: &'a str,
    pub inner: &'a str,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<String> {
        attr(self.open_tag, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|v| v.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
            .unwrap_or(false)
    }

    pub fn text(&self) -> String {
        text(self.inner)
    }
}

// 在 lower 中从 from 开始查找 prefix（如 "<tr" 或 "</tr"），要求其后为标签边界
fn find_tag(lower: &str, from: usize, prefix: &str) -> Option<usize> {
    let bytes = lower.as_bytes();
    let mut pos = from;
    while pos <= lower.len() {
        let idx = lower[pos..].find(prefix)? + pos;
        let after = idx + prefix.len();
        match bytes.get(after) {
            None => return None,
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(idx),
            _ => pos = after,
        }
    }
    None
}

fn element_at<'a>(html: &'a str, lower: &str, start: usize, tag: &str) -> Option<(Element<'a>, usize)> {
    let open_end = lower[start..].find('>')? + start + 1;
    let open_tag = &html[start..open_end];
    if open_tag.ends_with("/>") {
        return Some((Element { open_tag, inner: &html[open_end..open_end] }, open_end));
    }

    let open_prefix = format!("<{}", tag);
    let close_prefix = format!("</{}", tag);
    let mut depth = 1usize;
    let mut pos = open_end;

    loop {
        let next_open = find_tag(lower, pos, &open_prefix);
        let next_close = find_tag(lower, pos, &close_prefix);
        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                pos = o + open_prefix.len();
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    let end = lower[c..].find('>').map(|i| c + i + 1).unwrap_or(lower.len());
                    return Some((Element { open_tag, inner: &html[open_end..c] }, end));
                }
                pos = c + close_prefix.len();
            }
            (_, None) => {
                return Some((Element { open_tag, inner: &html[open_end..] }, html.len()));
            }
        }
    }
}

/// Sibling `tag` elements at the outermost level of `html`, in document order.
pub fn elements<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    let lower = html.to_ascii_lowercase();
    let prefix = format!("<{}", tag.to_ascii_lowercase());
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_tag(&lower, pos, &prefix) {
        match element_at(html, &lower, start, &tag.to_ascii_lowercase()) {
            Some((element, end)) => {
                out.push(element);
                pos = end;
            }
            None => break,
        }
    }
    out
}

/// First `tag` element at any depth that satisfies `pred`.
pub fn find_element<'a, F>(html: &'a str, tag: &str, pred: F) -> Option<Element<'a>>
where
    F: Fn(&Element<'a>) -> bool,
{
    let lower = html.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let prefix = format!("<{}", tag);
    let mut pos = 0;

    while let Some(start) = find_tag(&lower, pos, &prefix) {
        let (element, _) = element_at(html, &lower, start, &tag)?;
        if pred(&element) {
            return Some(element);
        }
        pos = start + prefix.len();
    }
    None
}

/// Every `tag` element at any depth that satisfies `pred`, by opening position.
pub fn find_all<'a, F>(html: &'a str, tag: &str, pred: F) -> Vec<Element<'a>>
where
    F: Fn(&Element<'a>) -> bool,
{
    let lower = html.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let prefix = format!("<{}", tag);
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_tag(&lower, pos, &prefix) {
        if let Some((element, _)) = element_at(html, &lower, start, &tag) {
            if pred(&element) {
                out.push(element);
            }
        }
        pos = start + prefix.len();
    }
    out
}

pub fn attr(open_tag: &str, name: &str) -> Option<String> {
    let lower = open_tag.to_ascii_lowercase();
    let needle = format!("{}=", name.to_ascii_lowercase());
    let bytes = lower.as_bytes();
    let mut pos = 0;

    while let Some(i) = lower[pos..].find(&needle) {
        let idx = pos + i;
        let boundary = idx > 0 && bytes[idx - 1].is_ascii_whitespace();
        let value_start = idx + needle.len();
        if !boundary {
            pos = value_start;
            continue;
        }
        let rest = &open_tag[value_start..];
        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => rest[1..].split(q).next().unwrap_or(""),
            _ => rest
                .split(|c: char| c.is_whitespace() || c == '>')
                .next()
                .unwrap_or(""),
        };
        return Some(decode_entities(value));
    }
    None
}

/// Text content with tags removed, entities decoded and whitespace collapsed.
pub fn text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    decode_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
