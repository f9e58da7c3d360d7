//! Selector parsing and matching for the element-matches primitive, built on
//! cssparser.
//!
//! The supported grammar is comma-separated compound selectors over `tag`,
//! `*`, `#id`, `.class`, `[attr]` and `[attr=value]`. Combinators, pseudo
//! classes and other attribute operators are rejected with an error rather
//! than treated as non-matching.

use anyhow::{Result, anyhow};
use cssparser::{Parser, ParserInput, Token};
use std::mem;

/// One constraint inside a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

/// All constraints that must hold on a single element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Comma-separated alternatives. The list matches when any compound does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub compounds: Vec<CompoundSelector>,
}

impl SimpleSelector {
    fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(name) => tag.eq_ignore_ascii_case(name),
            Self::Id(id) => attr_value(attrs, "id") == Some(id.as_str()),
            Self::Class(class) => attr_value(attrs, "class").is_some_and(|classes| {
                classes
                    .split_whitespace()
                    .any(|candidate| candidate == class)
            }),
            Self::Attribute { name, value: None } => attr_value(attrs, name).is_some(),
            Self::Attribute {
                name,
                value: Some(expected),
            } => attr_value(attrs, name) == Some(expected.as_str()),
        }
    }
}

impl CompoundSelector {
    /// Whether every constraint holds for an element with `tag` and `attrs`.
    pub fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        self.simples.iter().all(|simple| simple.matches(tag, attrs))
    }
}

impl SelectorList {
    /// Parse a selector string over the supported grammar.
    pub fn parse(selector: &str) -> Result<Self> {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);
        parse_selector_list(&mut parser)
            .map_err(|err| anyhow!("invalid selector {selector:?}: {err:?}"))
    }

    /// Whether any compound alternative matches.
    pub fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        self.compounds
            .iter()
            .any(|compound| compound.matches(tag, attrs))
    }
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(attr, _)| attr == name)
        .map(|(_, value)| value.as_str())
}

fn parse_selector_list<'i, 't>(
    parser: &mut Parser<'i, 't>,
) -> Result<SelectorList, cssparser::ParseError<'i, ()>> {
    let mut list = SelectorList::default();
    let mut current = CompoundSelector::default();
    // Set between tokens of the same selector; a gap would be a descendant
    // combinator, which the grammar does not include.
    let mut pending_gap = false;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        if matches!(token, Token::WhiteSpace(_)) {
            pending_gap = true;
            continue;
        }
        if matches!(token, Token::Comma) {
            finish_compound(parser, &mut list, &mut current)?;
            pending_gap = false;
            continue;
        }
        if pending_gap && !current.simples.is_empty() {
            // Descendant combinator.
            return Err(parser.new_custom_error(()));
        }
        pending_gap = false;

        match token {
            Token::Ident(name) => {
                if !current.simples.is_empty() {
                    return Err(parser.new_unexpected_token_error(Token::Ident(name)));
                }
                current.simples.push(SimpleSelector::Type(name.to_string()));
            }
            Token::Delim('*') => {
                if !current.simples.is_empty() {
                    return Err(parser.new_unexpected_token_error(Token::Delim('*')));
                }
                current.simples.push(SimpleSelector::Universal);
            }
            Token::IDHash(id) => {
                current.simples.push(SimpleSelector::Id(id.to_string()));
            }
            Token::Delim('.') => {
                let class = parser
                    .next_including_whitespace()
                    .ok()
                    .and_then(|next| match next {
                        Token::Ident(class) => Some(class.to_string()),
                        _ => None,
                    });
                let Some(class) = class else {
                    return Err(parser.new_unexpected_token_error(Token::Delim('.')));
                };
                current.simples.push(SimpleSelector::Class(class));
            }
            Token::SquareBracketBlock => {
                let simple = parser.parse_nested_block(|block| parse_attribute(block))?;
                current.simples.push(simple);
            }
            other => {
                // Covers combinators (`>`, `+`, `~`), pseudo classes and
                // anything else outside the grammar.
                return Err(parser.new_unexpected_token_error(other));
            }
        }
    }

    finish_compound(parser, &mut list, &mut current)?;
    Ok(list)
}

fn finish_compound<'i, 't>(
    parser: &Parser<'i, 't>,
    list: &mut SelectorList,
    current: &mut CompoundSelector,
) -> Result<(), cssparser::ParseError<'i, ()>> {
    if current.simples.is_empty() {
        // Empty selector, or a dangling comma.
        return Err(parser.new_custom_error(()));
    }
    list.compounds.push(mem::take(current));
    Ok(())
}

fn parse_attribute<'i, 't>(
    parser: &mut Parser<'i, 't>,
) -> Result<SimpleSelector, cssparser::ParseError<'i, ()>> {
    let name = parser.expect_ident()?.to_ascii_lowercase();
    if parser.is_exhausted() {
        return Ok(SimpleSelector::Attribute { name, value: None });
    }

    let operator = parser.next()?.clone();
    if !matches!(operator, Token::Delim('=')) {
        // `~=`, `^=` and friends are outside the grammar.
        return Err(parser.new_unexpected_token_error(operator));
    }

    let value = match parser.next()?.clone() {
        Token::Ident(value) => value.to_string(),
        Token::QuotedString(value) => value.to_string(),
        other => return Err(parser.new_unexpected_token_error(other)),
    };
    if !parser.is_exhausted() {
        let trailing = parser.next()?.clone();
        return Err(parser.new_unexpected_token_error(trailing));
    }
    Ok(SimpleSelector::Attribute {
        name,
        value: Some(value),
    })
}
