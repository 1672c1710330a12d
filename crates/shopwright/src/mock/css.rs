//! CSS subset matcher for the in-memory DOM.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr*="v"]`, `[attr^="v"]`, `[attr$="v"]`, the descendant combinator
//! and selector lists (`a, b`). Anything else is rejected the way
//! `querySelectorAll` rejects it: as a syntax error.

use crate::result::{ShopError, ShopResult};

/// Attribute comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr="v"]`
    Equals,
    /// `[attr*="v"]`
    Contains,
    /// `[attr^="v"]`
    Prefix,
    /// `[attr$="v"]`
    Suffix,
}

/// One attribute condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrCondition {
    /// Attribute name
    pub name: String,
    /// Operator
    pub op: AttrOp,
    /// Expected value (empty for `Exists`)
    pub value: String,
}

impl AttrCondition {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => actual.contains(&self.value),
            AttrOp::Prefix => actual.starts_with(&self.value),
            AttrOp::Suffix => actual.ends_with(&self.value),
        }
    }
}

/// A compound selector (no combinators)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Tag name, `None` for `*` or omitted
    pub tag: Option<String>,
    /// Required id
    pub id: Option<String>,
    /// Required classes
    pub classes: Vec<String>,
    /// Attribute conditions
    pub attrs: Vec<AttrCondition>,
}

/// What a compound needs to inspect on an element
pub trait Matchable {
    /// Lowercase tag name
    fn tag_name(&self) -> &str;
    /// Attribute value
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl Compound {
    /// Whether an element satisfies this compound
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(el.tag_name()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = el.attribute("class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|c| class_attr.split_whitespace().any(|h| h == c))
            {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|a| a.matches(el.attribute(&a.name)))
    }
}

/// A complex selector: compounds joined by descendant combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    /// Compounds, outermost first
    pub parts: Vec<Compound>,
}

impl Complex {
    /// Match a subject element given its ancestors (nearest first)
    pub fn matches<'a, M, I>(&self, subject: &M, ancestors: I) -> bool
    where
        M: Matchable + ?Sized + 'a,
        I: IntoIterator<Item = &'a M>,
    {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }
        let mut remaining = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match remaining.peek() {
                Some(part) if part.matches(ancestor) => {
                    let _ = remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// Alternatives
    pub alternatives: Vec<Complex>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> ShopResult<Self> {
        let mut alternatives = Vec::new();
        for part in split_top_level(input, ',')? {
            alternatives.push(parse_complex(part.trim(), input)?);
        }
        Ok(Self { alternatives })
    }

    /// Whether any alternative matches
    pub fn matches<'a, M, I>(&self, subject: &M, ancestors: I) -> bool
    where
        M: Matchable + ?Sized + 'a,
        I: IntoIterator<Item = &'a M> + Clone,
    {
        self.alternatives
            .iter()
            .any(|c| c.matches(subject, ancestors.clone()))
    }
}

fn syntax_error(input: &str) -> ShopError {
    ShopError::driver(format!("'{input}' is not a valid selector"))
}

/// Split on `sep` outside of brackets and quotes
fn split_top_level(input: &str, sep: char) -> ShopResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(syntax_error(input));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_complex(input: &str, whole: &str) -> ShopResult<Complex> {
    if input.is_empty() {
        return Err(syntax_error(whole));
    }
    let mut parts = Vec::new();
    for token in split_top_level(input, ' ')? {
        if token.is_empty() {
            continue;
        }
        parts.push(parse_compound(token, whole)?);
    }
    if parts.is_empty() {
        return Err(syntax_error(whole));
    }
    Ok(Complex { parts })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(token: &str, whole: &str) -> ShopResult<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if chars.first() == Some(&'*') {
        i = 1;
    } else if chars.first().is_some_and(|c| c.is_ascii_alphabetic()) {
        compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = read_ident(&mut i);
                if id.is_empty() {
                    return Err(syntax_error(whole));
                }
                compound.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if class.is_empty() {
                    return Err(syntax_error(whole));
                }
                compound.classes.push(class);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| syntax_error(whole))?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body, whole)?);
                i = close + 1;
            }
            _ => return Err(syntax_error(whole)),
        }
    }
    Ok(compound)
}

fn parse_attr(body: &str, whole: &str) -> ShopResult<AttrCondition> {
    let ops = [
        ("*=", AttrOp::Contains),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("=", AttrOp::Equals),
    ];
    for (token, op) in ops {
        if let Some((name, value)) = body.split_once(token) {
            let name = name.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(syntax_error(whole));
            }
            return Ok(AttrCondition {
                name: name.to_string(),
                op,
                value: unquoted.to_string(),
            });
        }
    }
    let name = body.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(syntax_error(whole));
    }
    Ok(AttrCondition {
        name: name.to_string(),
        op: AttrOp::Exists,
        value: String::new(),
    })
}
