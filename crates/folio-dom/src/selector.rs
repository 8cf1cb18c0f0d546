//! Selector engine
//!
//! Parses and matches the CSS selector subset page scripts lean on:
//! type, id, class, universal and attribute selectors, compound
//! selectors, descendant/child combinators and selector lists.

/// Selector parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected end of selector `{0}`")]
    UnexpectedEnd(String),

    #[error("unexpected `{found}` at offset {offset} in selector `{selector}`")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    #[error("invalid identifier at offset {offset} in selector `{selector}`")]
    InvalidIdentifier { selector: String, offset: usize },

    #[error("unterminated string in selector `{0}`")]
    UnterminatedString(String),

    #[error("selector `{0}` rejected by the document")]
    Rejected(String),
}

/// Element view the matcher walks
pub trait SelectorElement: Sized {
    /// Lower-case tag name
    fn local_name(&self) -> &str;

    fn attr(&self, name: &str) -> Option<&str>;

    fn parent_element(&self) -> Option<Self>;

    fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|list| list.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
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
        let (matcher, value) = match (&self.matcher, value) {
            (None, value) => return value.is_some(),
            (Some(_), None) => return false,
            (Some(matcher), Some(value)) => (matcher, value),
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };
        let value = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => value == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && value.split_ascii_whitespace().any(|v| v == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                value == expected || value.starts_with(&format!("{expected}-"))
            }
            // Empty operands never match for the substring family
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && value.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && value.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && value.contains(&fold(expected))
            }
        }
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compound selector, e.g. `section.hero[id]`
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.components.iter().all(|component| match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(name) => element.local_name().eq_ignore_ascii_case(name),
            SelectorComponent::Id(id) => element.id() == Some(id.as_str()),
            SelectorComponent::Class(class) => element.has_class(class),
            SelectorComponent::Attribute(attr) => attr.matches(element.attr(&attr.name)),
        })
    }
}

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    /// The leftmost compound
    pub head: CompoundSelector,
    /// Each following compound with the combinator to its left
    pub tail: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        let mut parts: Vec<(Option<Combinator>, &CompoundSelector)> = Vec::with_capacity(self.tail.len() + 1);
        parts.push((None, &self.head));
        parts.extend(self.tail.iter().map(|(c, s)| (Some(*c), s)));
        match_from(&parts, parts.len() - 1, element)
    }
}

/// Right-to-left match with backtracking over descendant combinators
fn match_from<E: SelectorElement>(
    parts: &[(Option<Combinator>, &CompoundSelector)],
    index: usize,
    element: &E,
) -> bool {
    let (combinator, compound) = parts[index];
    if !compound.matches(element) {
        return false;
    }

    match combinator {
        None => true,
        Some(Combinator::Child) => element
            .parent_element()
            .map(|parent| match_from(parts, index - 1, &parent))
            .unwrap_or(false),
        Some(Combinator::Descendant) => {
            let mut ancestor = element.parent_element();
            while let Some(current) = ancestor {
                if match_from(parts, index - 1, &current) {
                    return true;
                }
                ancestor = current.parent_element();
            }
            false
        }
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    /// Any selector in the list matches
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            found,
            offset: self.pos,
        }
    }

    fn end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd(self.source.to_string())
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        if self.source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                }
                Some(c) => return Err(self.unexpected(c)),
            }
        }

        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let head = self.parse_compound()?;
        let mut tail = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            tail.push((combinator, self.parse_compound()?));
        }

        Ok(ComplexSelector { head, tail })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            None => return Err(self.end()),
            Some('*') => {
                self.pos += 1;
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) || c == '-' || c == '\\' => {
                let name = self.parse_ident()?;
                components.push(SelectorComponent::Type(name.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end(),
            });
        }

        Ok(CompoundSelector { components })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        let mut ident = String::new();
        if self.peek() == Some('-') {
            ident.push('-');
            self.pos += 1;
        }
        match self.peek() {
            Some('\\') => ident.push(self.parse_escape(start)?),
            Some(c) if is_ident_start(c) || (c == '-' && !ident.is_empty()) => {
                ident.push(c);
                self.pos += 1;
            }
            None => return Err(self.end()),
            Some(_) => {
                return Err(SelectorError::InvalidIdentifier {
                    selector: self.source.to_string(),
                    offset: start,
                });
            }
        }
        loop {
            match self.peek() {
                Some('\\') => ident.push(self.parse_escape(start)?),
                Some(c) if is_ident_char(c) => {
                    ident.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }

        Ok(ident)
    }

    /// `\` then up to six hex digits and one optional space, or any
    /// character other than a newline taken literally
    fn parse_escape(&mut self, start: usize) -> Result<char, SelectorError> {
        self.pos += 1;
        let mut hex = String::new();
        while hex.len() < 6 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }

        if !hex.is_empty() {
            if matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.pos += 1;
            }
            return Ok(u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .filter(|&c| c != '\0')
                .unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        match self.bump() {
            None => Err(self.end()),
            Some('\n' | '\r' | '\u{c}') => Err(SelectorError::InvalidIdentifier {
                selector: self.source.to_string(),
                offset: start,
            }),
            Some(c) => Ok(c),
        }
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.bump() {
            None => return Err(self.end()),
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => match self.bump() {
                Some('=') => Some(c),
                Some(other) => {
                    self.pos -= 1;
                    return Err(self.unexpected(other));
                }
                None => return Err(self.end()),
            },
            Some(c) => {
                self.pos -= 1;
                return Err(self.unexpected(c));
            }
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(q)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(self.end()),
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if matches!(self.peek(), Some('i' | 'I')) {
            case_insensitive = true;
            self.pos += 1;
            self.skip_whitespace();
        } else if matches!(self.peek(), Some('s' | 'S')) {
            self.pos += 1;
            self.skip_whitespace();
        }

        match self.bump() {
            Some(']') => {}
            Some(c) => {
                self.pos -= 1;
                return Err(self.unexpected(c));
            }
            None => return Err(self.end()),
        }

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnterminatedString(self.source.to_string())),
                Some('\\') => match self.bump() {
                    Some(c) => value.push(c),
                    None => return Err(SelectorError::UnterminatedString(self.source.to_string())),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}
