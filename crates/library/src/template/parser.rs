//! Template tokenizer.
//!
//! Splits a naming template into literal text and placeholder fields. The
//! brace rules follow Python's `str.format`, minus everything that would need
//! an object model (attributes, indexing, conversions, nested fields).

use super::error::{ErrorKind, Result};
use super::placeholder::{FormatSpec, Placeholder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field { placeholder: Placeholder, spec: FormatSpec },
}

pub fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            '{' if chars.peek().is_some_and(|(_, next)| *next == '{') => {
                chars.next();
                literal.push('{');
            },
            '}' if chars.peek().is_some_and(|(_, next)| *next == '}') => {
                chars.next();
                literal.push('}');
            },
            '}' => exn::bail!(ErrorKind::syntax(position, "single `}` encountered")),
            '{' => {
                let start = position + 1;
                let end = loop {
                    match chars.next() {
                        Some((end, '}')) => break end,
                        Some((_, '{')) => exn::bail!(ErrorKind::syntax(position, "nested fields are not supported")),
                        Some(_) => {},
                        None => exn::bail!(ErrorKind::syntax(position, "unclosed `{`")),
                    }
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(field(&template[start..end], position)?);
            },
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn field(content: &str, position: usize) -> Result<Segment> {
    let (name, spec) = content.split_once(':').unwrap_or((content, ""));
    if name.contains('!') {
        exn::bail!(ErrorKind::syntax(position, "conversions are not supported"));
    }
    if name.contains(['.', '[', ']']) {
        exn::bail!(ErrorKind::syntax(position, "attribute and index access are not supported"));
    }
    if name.is_empty() || name.bytes().all(|b| b.is_ascii_digit()) {
        exn::bail!(ErrorKind::syntax(position, "fields must be named"));
    }
    let placeholder = Placeholder::from_name(name).ok_or_else(|| ErrorKind::UnknownPlaceholder(name.to_string()))?;
    let unsupported = || ErrorKind::UnsupportedFormat { placeholder: placeholder.name(), spec: spec.to_string() };
    let spec = FormatSpec::parse(spec).ok_or_else(unsupported)?;
    if !spec.accepts(placeholder) {
        exn::bail!(unsupported());
    }
    Ok(Segment::Field { placeholder, spec })
}
