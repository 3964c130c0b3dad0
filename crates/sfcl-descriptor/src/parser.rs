use camino::Utf8Path;
use serde::Serialize;
use sfcl_source::Span;
use thiserror::Error;

use crate::descriptor::Attr;
use crate::descriptor::Attrs;
use crate::descriptor::Block;
use crate::descriptor::CustomBlock;
use crate::descriptor::Descriptor;
use crate::sourcemap;

/// Inputs handed to the compiler frontend.
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub source: &'a str,
    pub filename: &'a str,
    pub source_root: &'a Utf8Path,
    pub need_map: bool,
}

/// The compiler frontend that turns composite source text into blocks.
pub trait BlockParser: Send + Sync {
    fn parse(&self, request: ParseRequest<'_>) -> Result<Descriptor, ParseError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Top-level block splitter.
///
/// Only the outermost tags are recognised; block contents are kept verbatim.
/// `<script>` and `<style>` are raw text, every other block tracks nesting of
/// its own tag name so `<template>` inside `<template>` closes correctly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitParser;

impl BlockParser for SplitParser {
    fn parse(&self, request: ParseRequest<'_>) -> Result<Descriptor, ParseError> {
        let mut descriptor = Descriptor::default();

        for raw in Scanner::new(request.source).blocks()? {
            let mut block = Block::new(
                &request.source[raw.content.start_usize()..raw.content.end_usize()],
                raw.attrs,
                raw.content,
            );
            if request.need_map {
                block.map = Some(sourcemap::line_map(
                    request.filename,
                    request.source_root,
                    request.source,
                    raw.content,
                ));
            }

            match raw.name.as_str() {
                "template" => set_once(&mut descriptor.template, block, "template", raw.tag)?,
                "script" if block.attrs.has("setup") => {
                    set_once(&mut descriptor.script_setup, block, "script setup", raw.tag)?;
                }
                "script" => set_once(&mut descriptor.script, block, "script", raw.tag)?,
                "style" => descriptor.styles.push(block),
                other => descriptor.custom_blocks.push(CustomBlock {
                    block_type: other.to_string(),
                    block,
                }),
            }
        }

        Ok(descriptor)
    }
}

fn set_once(
    slot: &mut Option<Block>,
    block: Block,
    what: &str,
    tag: Span,
) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::new(
            format!("Single file component can contain only one <{what}> element"),
            Some(tag),
        ));
    }
    *slot = Some(block);
    Ok(())
}

struct RawBlock {
    name: String,
    attrs: Attrs,
    /// Opening tag.
    tag: Span,
    content: Span,
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn blocks(mut self) -> Result<Vec<RawBlock>, ParseError> {
        let mut blocks = Vec::new();

        while let Some(offset) = self.source[self.pos..].find('<') {
            let start = self.pos + offset;
            let rest = &self.source[start..];

            if rest.starts_with("<!--") {
                let Some(end) = rest.find("-->") else {
                    return Err(ParseError::new(
                        "Unterminated comment",
                        Some(Span::from_bounds(start, self.source.len())),
                    ));
                };
                self.pos = start + end + 3;
                continue;
            }

            let name_len = tag_name_len(&rest[1..]);
            if name_len == 0 {
                // Stray `<`, closing tags and doctypes between blocks are ignored.
                self.pos = start + 1;
                continue;
            }

            let name = rest[1..=name_len].to_string();
            self.pos = start + 1 + name_len;
            let (attrs, self_closing) = self.attributes(start)?;
            let tag = Span::from_bounds(start, self.pos);

            let content = if self_closing {
                Span::from_bounds(self.pos, self.pos)
            } else {
                let content_start = self.pos;
                let (close_start, close_end) = self.closing_tag(&name).ok_or_else(|| {
                    ParseError::new(format!("Element <{name}> is missing end tag."), Some(tag))
                })?;
                self.pos = close_end;
                Span::from_bounds(content_start, close_start)
            };

            blocks.push(RawBlock {
                name,
                attrs,
                tag,
                content,
            });
        }

        Ok(blocks)
    }

    /// Parse attributes up to and including the end of the opening tag.
    fn attributes(&mut self, tag_start: usize) -> Result<(Attrs, bool), ParseError> {
        let bytes = self.source.as_bytes();
        let mut attrs = Attrs::default();
        let unclosed = || {
            ParseError::new(
                "Unclosed opening tag",
                Some(Span::from_bounds(tag_start, self.source.len())),
            )
        };

        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            match bytes.get(self.pos) {
                None => return Err(unclosed()),
                Some(b'>') => {
                    self.pos += 1;
                    return Ok((attrs, false));
                }
                Some(b'/') if bytes.get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    return Ok((attrs, true));
                }
                Some(b'/') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => {}
            }

            let name_start = self.pos;
            while self.pos < bytes.len()
                && !bytes[self.pos].is_ascii_whitespace()
                && !matches!(bytes[self.pos], b'=' | b'>' | b'/')
            {
                self.pos += 1;
            }
            let name = self.source[name_start..self.pos].to_string();

            let mut lookahead = self.pos;
            while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
                lookahead += 1;
            }
            if bytes.get(lookahead) != Some(&b'=') {
                attrs.insert(name, None);
                continue;
            }

            self.pos = lookahead + 1;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            let value = match bytes.get(self.pos) {
                None => return Err(unclosed()),
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = self.pos + 1;
                    let len = self.source[value_start..]
                        .find(char::from(quote))
                        .ok_or_else(unclosed)?;
                    self.pos = value_start + len + 1;
                    &self.source[value_start..value_start + len]
                }
                Some(_) => {
                    let value_start = self.pos;
                    while self.pos < bytes.len()
                        && !bytes[self.pos].is_ascii_whitespace()
                        && bytes[self.pos] != b'>'
                    {
                        self.pos += 1;
                    }
                    &self.source[value_start..self.pos]
                }
            };
            attrs.insert(name, Some(value.to_string()));
        }
    }

    /// Find the matching `</name>` for a block opened just before `self.pos`.
    fn closing_tag(&self, name: &str) -> Option<(usize, usize)> {
        let close = format!("</{name}");
        if matches!(name, "script" | "style") {
            let mut from = self.pos;
            loop {
                let at = from + self.source[from..].find(&close)?;
                if let Some(end) = self.tag_end(at + close.len()) {
                    return Some((at, end));
                }
                from = at + close.len();
            }
        }

        let open = format!("<{name}");
        let mut depth = 0usize;
        let mut from = self.pos;
        loop {
            let next_close = from + self.source[from..].find(&close)?;
            let next_open = self.source[from..next_close]
                .match_indices(&open)
                .map(|(idx, _)| from + idx)
                .find(|&idx| self.is_name_boundary(idx + open.len()));

            if let Some(idx) = next_open {
                depth += 1;
                from = idx + open.len();
                continue;
            }

            let Some(end) = self.tag_end(next_close + close.len()) else {
                from = next_close + close.len();
                continue;
            };
            if depth == 0 {
                return Some((next_close, end));
            }
            depth -= 1;
            from = end;
        }
    }

    /// `at` points right after a closing tag name; accept `\s*>`.
    fn tag_end(&self, at: usize) -> Option<usize> {
        let rest = &self.source[at..];
        let trimmed = rest.trim_start();
        trimmed
            .starts_with('>')
            .then(|| at + (rest.len() - trimmed.len()) + 1)
    }

    fn is_name_boundary(&self, at: usize) -> bool {
        self.source[at..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
    }
}

fn tag_name_len(rest: &str) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
        .map_or(rest.len(), |(idx, _)| idx)
}
