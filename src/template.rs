//! Output templates and entry rendering.
//!
//! Templates substitute `$field` or `${field}` with the entry's value; `$$`
//! prints a literal dollar sign. Unknown fields are left as written so typos
//! show up in the output instead of silently vanishing.

use crate::entry::Fields;
use anyhow::{Context, Result};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`. Parsing never fails; malformed placeholders such as a
    /// trailing `$` or an unclosed `${` are kept as literal text.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            match chars.peek().copied() {
                Some((_, '$')) => {
                    chars.next();
                    literal.push('$');
                }
                Some((start, '{')) => {
                    let rest = &source[start + 1..];
                    match rest.find('}') {
                        Some(len) if is_field_name(&rest[..len]) => {
                            flush(&mut literal, &mut segments);
                            segments.push(Segment::Field(rest[..len].to_string()));
                            // Skip `{`, the name and `}`.
                            for _ in 0..len + 2 {
                                chars.next();
                            }
                        }
                        _ => literal.push('$'),
                    }
                }
                Some((_, next)) if is_field_char(next) => {
                    flush(&mut literal, &mut segments);
                    let mut name = String::new();
                    while let Some(&(_, next)) = chars.peek() {
                        if !is_field_char(next) {
                            break;
                        }
                        name.push(next);
                        chars.next();
                    }
                    segments.push(Segment::Field(name));
                }
                _ => literal.push('$'),
            }
        }
        flush(&mut literal, &mut segments);

        Self {
            source: source.to_string(),
            segments,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the template for one entry.
    #[must_use]
    pub fn render<E: Fields + ?Sized>(&self, entry: &E) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => match entry.field(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('$');
                        out.push_str(name);
                    }
                },
            }
        }
        out
    }
}

/// Write one rendered line per entry, in order.
///
/// # Errors
///
/// Fails if writing to `out` fails (for example a closed pipe).
pub fn print_entries<E, W>(entries: &[E], template: &Template, out: &mut W) -> Result<()>
where
    E: Fields,
    W: Write,
{
    for entry in entries {
        writeln!(out, "{}", template.render(entry)).context("Failed to write entry to output")?;
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_field_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Album;

    fn album() -> Album {
        Album {
            id: 3,
            albumartist: "Miles Davis".to_string(),
            album: "Kind of Blue".to_string(),
            path: "/music/Miles Davis/Kind of Blue".to_string(),
            track_count: 5,
        }
    }

    #[test]
    fn test_plain_placeholders() {
        let template = Template::parse("$albumartist - $album");
        assert_eq!(template.render(&album()), "Miles Davis - Kind of Blue");
    }

    #[test]
    fn test_braced_placeholder_next_to_text() {
        let template = Template::parse("${album}x$tracks");
        assert_eq!(template.render(&album()), "Kind of Bluex5");
    }

    #[test]
    fn test_dollar_escapes_and_malformed_placeholders() {
        let template = Template::parse("$$5 ${ $ ${bad name}");
        assert_eq!(template.render(&album()), "$5 ${ $ ${bad name}");
    }

    #[test]
    fn test_unknown_field_is_kept() {
        let template = Template::parse("$title ($album)");
        assert_eq!(template.render(&album()), "$title (Kind of Blue)");
    }

    #[test]
    fn test_non_ascii_literals() {
        let template = Template::parse("♪ $album ♪");
        assert_eq!(template.render(&album()), "♪ Kind of Blue ♪");
        assert_eq!(template.source(), "♪ $album ♪");
    }

    #[test]
    fn test_print_entries_writes_one_line_each() {
        let template = Template::parse("$path");
        let entries = vec![album(), Album { path: "/b".to_string(), ..album() }];
        let mut out = Vec::new();

        print_entries(&entries, &template, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/music/Miles Davis/Kind of Blue\n/b\n"
        );
    }
}
