//! Selector Engine
//!
//! Parses selector lists and matches them against elements. Matching is
//! scoped: ancestor walks for combinators stop at a shadow root, exactly like
//! a native `querySelectorAll` that cannot see across shadow boundaries.
//!
//! Supported grammar:
//! - selector lists (`a, b`)
//! - descendant (` `) and child (`>`) combinators
//! - type, universal, `#id`, `.class`, attribute selectors, `:not(<compound>)`

use crate::{DomError, DomTree, ElementData, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

type Compound = Vec<SelectorComponent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// :not(compound)
    Not(Vec<SelectorComponent>),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| if self.case_insensitive { s.to_lowercase() } else { s.to_string() };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && val.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            // Empty operands never match for the substring family
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

impl SelectorComponent {
    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(tag) => element.tag.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.classes().any(|c| c == class),
            Self::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
            Self::Not(inner) => !inner.iter().all(|c| c.matches(element)),
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in split_top_level(input, ',').map_err(|r| invalid(r))? {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector in list"));
            }
            alternatives.push(parse_complex(part).map_err(|r| invalid(&r))?);
        }

        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// The selector text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does `id` match any alternative of this selector list?
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.get(id)
            .and_then(|n| n.as_element())
            .is_some_and(|_| self.alternatives.iter().any(|alt| alt.matches(tree, id)))
    }
}

impl std::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.matches_from(tree, id, self.compounds.len() - 1)
    }

    fn matches_from(&self, tree: &DomTree, id: NodeId, index: usize) -> bool {
        let Some(element) = tree.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        if !self.compounds[index].iter().all(|c| c.matches(element)) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent_element(id)
                .is_some_and(|parent| self.matches_from(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent_element(id);
                while let Some(ancestor) = current {
                    if self.matches_from(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = tree.parent_element(ancestor);
                }
                false
            }
        }
    }
}

impl DomTree {
    /// Native shallow query: elements below `scope` matching `selector`,
    /// in tree order, without entering shadow roots
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// First shallow match below `scope`
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope).find(|&id| selector.matches(self, id))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Split on `sep` outside brackets, parentheses and quotes
fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.checked_sub(1).ok_or("unbalanced brackets")?,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string");
    }
    if depth != 0 {
        return Err("unbalanced brackets");
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_complex(input: &str) -> Result<ComplexSelector, String> {
    let mut cursor = Cursor::new(input);
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();

    loop {
        cursor.skip_whitespace();
        let Some(c) = cursor.peek() else { break };

        if c == '>' {
            if compounds.is_empty() {
                return Err("selector starts with a combinator".into());
            }
            cursor.bump();
            cursor.skip_whitespace();
            if cursor.peek().is_none() {
                return Err("dangling combinator".into());
            }
            combinators.push(Combinator::Child);
        } else if !compounds.is_empty() {
            combinators.push(Combinator::Descendant);
        }
        compounds.push(cursor.compound()?);
    }

    if compounds.is_empty() {
        return Err("empty selector".into());
    }
    Ok(ComplexSelector { compounds, combinators })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Result<&'a str, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        let ident = &self.input[start..self.pos];
        if is_valid_ident(ident) {
            Ok(ident)
        } else {
            Err(format!("expected identifier at offset {}", start))
        }
    }

    /// Consume up to the bracket that closes the one just consumed
    fn until_close(&mut self, close: char) -> Result<&'a str, String> {
        let open = if close == ']' { '[' } else { '(' };
        let start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.bump() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, c) if c == open => depth += 1,
                (None, c) if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.input[start..self.pos - close.len_utf8()]);
                    }
                }
                _ => {}
            }
        }
        Err(format!("missing `{}`", close))
    }

    /// Parse components until whitespace, a combinator or the end
    fn compound(&mut self) -> Result<Vec<SelectorComponent>, String> {
        let mut components = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '>' {
                break;
            }
            let component = match c {
                '*' => {
                    self.bump();
                    SelectorComponent::Universal
                }
                '#' => {
                    self.bump();
                    SelectorComponent::Id(self.ident()?.to_string())
                }
                '.' => {
                    self.bump();
                    SelectorComponent::Class(self.ident()?.to_string())
                }
                '[' => {
                    self.bump();
                    let content = self.until_close(']')?;
                    SelectorComponent::Attribute(parse_attribute_selector(content)?)
                }
                ':' => {
                    self.bump();
                    let name = self.ident()?.to_ascii_lowercase();
                    if name != "not" || self.peek() != Some('(') {
                        return Err(format!("unsupported pseudo-class `:{}`", name));
                    }
                    self.bump();
                    let inner = self.until_close(')')?;
                    let mut nested = Cursor::new(inner.trim());
                    let compound = nested.compound()?;
                    if nested.peek().is_some() {
                        return Err(":not() takes a single compound selector".into());
                    }
                    SelectorComponent::Not(compound)
                }
                c if c.is_alphabetic() || c == '_' || c == '-' => {
                    if !components.is_empty() {
                        return Err("type selector must come first in a compound".into());
                    }
                    SelectorComponent::Type(self.ident()?.to_ascii_lowercase())
                }
                '+' | '~' => return Err(format!("unsupported combinator `{}`", c)),
                other => return Err(format!("unexpected `{}`", other)),
            };
            components.push(component);
        }

        if components.is_empty() {
            return Err("expected a selector".into());
        }
        Ok(components)
    }
}

/// Check if string is a valid CSS identifier
fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some('-') => chars.next().is_some_and(|c| !c.is_ascii_digit()),
        Some(c) => c.is_alphabetic() || c == '_',
        None => false,
    }
}

/// Parse an attribute selector content (without brackets)
fn parse_attribute_selector(content: &str) -> Result<AttributeSelector, String> {
    let content = content.trim();

    let Some(eq) = content.find('=') else {
        return Ok(AttributeSelector {
            name: attribute_name(content)?,
            matcher: None,
            case_insensitive: false,
        });
    };

    let (name_end, matcher_fn): (usize, fn(String) -> AttributeMatcher) = match content[..eq].chars().last() {
        Some('~') => (eq - 1, AttributeMatcher::Contains),
        Some('|') => (eq - 1, AttributeMatcher::DashMatch),
        Some('^') => (eq - 1, AttributeMatcher::Prefix),
        Some('$') => (eq - 1, AttributeMatcher::Suffix),
        Some('*') => (eq - 1, AttributeMatcher::Substring),
        _ => (eq, AttributeMatcher::Exact),
    };

    let name = attribute_name(&content[..name_end])?;
    let (value, case_insensitive) = attribute_value(content[eq + 1..].trim())?;
    Ok(AttributeSelector {
        name,
        matcher: Some(matcher_fn(value)),
        case_insensitive,
    })
}

fn attribute_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if !is_valid_ident(name) {
        return Err(format!("invalid attribute name `{}`", name));
    }
    Ok(name.to_ascii_lowercase())
}

/// Value plus the trailing ` i` / ` s` flag
fn attribute_value(raw: &str) -> Result<(String, bool), String> {
    let (body, flag) = match raw.rsplit_once(char::is_whitespace) {
        Some((body, flag)) if flag.eq_ignore_ascii_case("i") || flag.eq_ignore_ascii_case("s") => {
            (body.trim(), flag.eq_ignore_ascii_case("i"))
        }
        _ => (raw, false),
    };

    let value = match body.chars().next() {
        Some(q @ ('"' | '\'')) => body
            .strip_prefix(q)
            .and_then(|b| b.strip_suffix(q))
            .ok_or_else(|| "unterminated attribute value".to_string())?,
        _ if body.is_empty() || body.contains(char::is_whitespace) => {
            return Err(format!("invalid attribute value `{}`", body));
        }
        _ => body,
    };
    Ok((value.to_string(), flag))
}
