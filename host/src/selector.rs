//! The selector subset understood by the in-memory backend.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! compounds of these (`input.name[type="text"]`) and comma-separated lists.
//! Combinators are rejected with [`HostError::Syntax`].

use crate::{HTML_NAMESPACE, HostError, memory::Element};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    parts: Vec<Simple>,
}

/// A parsed, comma-separated list of compound selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    compounds: Vec<Compound>,
}

impl SelectorList {
    pub(crate) fn parse(input: &str) -> Result<Self, HostError> {
        let mut compounds = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(HostError::Syntax(format!("empty selector in `{input}`")));
            }
            compounds.push(Parser::new(part).compound()?);
        }
        Ok(Self { compounds })
    }

    pub(crate) fn matches(&self, element: &Element) -> bool {
        self.compounds
            .iter()
            .any(|compound| compound.matches(element))
    }
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        let is_html = element.namespace_uri().as_deref() == Some(HTML_NAMESPACE);
        self.parts.iter().all(|part| match part {
            Simple::Type(name) => {
                let local = element.local_name();
                if is_html {
                    local.eq_ignore_ascii_case(name)
                } else {
                    local == *name
                }
            }
            Simple::Id(id) => element.get_attribute("id").as_deref() == Some(id.as_str()),
            Simple::Class(class) => element.class_list().iter().any(|c| c == class),
            Simple::Attribute { name, value } => match (element.get_attribute(name), value) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
        })
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            source,
        }
    }

    fn error(&self, message: &str) -> HostError {
        HostError::Syntax(format!("{message} in `{}`", self.source))
    }

    fn compound(&mut self) -> Result<Compound, HostError> {
        let mut compound = Compound::default();

        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
            }
            Some(&c) if is_ident_start(c) => compound.parts.push(Simple::Type(self.ident()?)),
            _ => {}
        }

        while let Some(&c) = self.chars.peek() {
            match c {
                '#' => {
                    self.chars.next();
                    compound.parts.push(Simple::Id(self.ident()?));
                }
                '.' => {
                    self.chars.next();
                    compound.parts.push(Simple::Class(self.ident()?));
                }
                '[' => {
                    self.chars.next();
                    compound.parts.push(self.attribute()?);
                }
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                    return Err(self.error("combinators are not supported"));
                }
                _ => return Err(self.error("unexpected character")),
            }
        }

        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Simple, HostError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let value = match self.chars.next() {
            Some(']') => return Ok(Simple::Attribute { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                match self.chars.peek().copied() {
                    Some(quote) if quote == '"' || quote == '\'' => {
                        self.chars.next();
                        self.quoted(quote)?
                    }
                    _ => self.ident()?,
                }
            }
            _ => return Err(self.error("malformed attribute selector")),
        };
        self.skip_whitespace();
        if self.chars.next() != Some(']') {
            return Err(self.error("unterminated attribute selector"));
        }
        Ok(Simple::Attribute {
            name,
            value: Some(value),
        })
    }

    fn quoted(&mut self, quote: char) -> Result<String, HostError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.chars.next() {
                    Some(c) => value.push(c),
                    None => return Err(self.error("dangling escape")),
                },
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn ident(&mut self) -> Result<String, HostError> {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\\' {
                self.chars.next();
                match self.chars.next() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_ident_char(c) {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            Err(self.error("expected an identifier"))
        } else {
            Ok(ident)
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '-' | '\\') || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-') || !c.is_ascii()
}
