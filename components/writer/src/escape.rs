use std::io;

use crate::UnicodeWrite;

/// Strategy to escape character data
///
/// see https://www.w3.org/TR/REC-xml/#dt-chardata
pub trait Escape {
    fn escape_content<W: UnicodeWrite>(&self, input: &str, write: &mut W) -> io::Result<()>;
    fn escape_attr_value_quot<W: UnicodeWrite>(&self, input: &str, write: &mut W)
        -> io::Result<()>;
}

/// Replace every char matched by `replacement` and copy the rest verbatim
fn escape_with<W: UnicodeWrite>(
    input: &str,
    write: &mut W,
    replacement: impl Fn(&str, usize) -> Option<&'static str>,
) -> io::Result<()> {
    let mut p = 0;
    for (i, c) in input.char_indices() {
        if let Some(entity) = replacement(input, i) {
            write.write_all(&input[p..i])?;
            write.write_all(entity)?;
            p = i + c.len_utf8();
        }
    }
    write.write_all(&input[p..])
}

/// Escape `&`, `<`, `>` and `"` everywhere
pub struct DefaultEscaper;

impl DefaultEscaper {
    fn entity(s: &str, i: usize) -> Option<&'static str> {
        match s.as_bytes()[i] {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            b'"' => Some("&quot;"),
            _ => None,
        }
    }
}

impl Escape for DefaultEscaper {
    fn escape_content<W: UnicodeWrite>(&self, input: &str, write: &mut W) -> io::Result<()> {
        escape_with(input, write, Self::entity)
    }

    fn escape_attr_value_quot<W: UnicodeWrite>(
        &self,
        input: &str,
        write: &mut W,
    ) -> io::Result<()> {
        escape_with(input, write, Self::entity)
    }
}
