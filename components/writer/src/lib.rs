use std::borrow::Cow;
use std::io;

use crate::escape::Escape;
use crate::write::UnicodeWrite;

pub mod escape;
pub mod write;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Prolog,
    Main,
    Epilog,
}

/// Streaming XML writer
///
/// Writes markup as it is requested. Names are written as given, so callers
/// are responsible for passing already qualified names (`prefix:local`).
pub struct XmlWriter<'w, W: UnicodeWrite, E: Escape> {
    state: State,
    stack: Vec<Cow<'w, str>>,
    writer: W,
    escaper: E,
}

impl<'w, W: UnicodeWrite, E: Escape> XmlWriter<'w, W, E> {
    pub fn for_writer(writer: W, escaper: E) -> Self {
        Self {
            state: State::Prolog,
            stack: vec![],
            writer,
            escaper,
        }
    }

    pub fn element<'a>(
        &'a mut self,
        name: impl Into<Cow<'w, str>>,
    ) -> io::Result<XmlElementWriter<'a, 'w, W, E>> {
        if self.state == State::Epilog {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "second root element",
            ));
        }

        let name = name.into();
        self.writer.write_fmt(format_args!("<{}", name))?;
        self.state = State::Main;
        Ok(XmlElementWriter { name, ser: self })
    }

    pub fn end_element(&mut self) -> io::Result<()> {
        let name = self.stack.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no open element to close")
        })?;
        self.writer.write_fmt(format_args!("</{}>", name))?;
        if self.stack.is_empty() {
            self.state = State::Epilog;
        }
        Ok(())
    }

    pub fn characters(&mut self, characters: &str) -> io::Result<()> {
        self.escaper.escape_content(characters, &mut self.writer)
    }

    pub fn cdata(&mut self, characters: &str) -> io::Result<()> {
        if characters.contains("]]>") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CDATA section must not contain `]]>`",
            ));
        }
        write!(self.writer, "<![CDATA[{}]]>", characters)
    }

    pub fn comment(&mut self, comment: &str) -> io::Result<()> {
        if comment.contains("--") || comment.ends_with('-') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "comment must not contain `--` or end with `-`",
            ));
        }
        write!(self.writer, "<!--{}-->", comment)
    }

    /// Check that every element has been closed and flush the output
    pub fn finish(mut self) -> io::Result<()> {
        if !self.stack.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("missing end_element call(s): {}", self.stack.join(", ")),
            ));
        }
        self.writer.flush()
    }
}

pub struct XmlElementWriter<'ser, 'w, W: UnicodeWrite, E: Escape> {
    name: Cow<'w, str>,
    ser: &'ser mut XmlWriter<'w, W, E>,
}

impl<'ser, 'w, W: UnicodeWrite, E: Escape> XmlElementWriter<'ser, 'w, W, E> {
    pub fn attribute(self, key: &str, value: &str) -> io::Result<Self> {
        self.ser.writer.write_all(" ")?;
        self.ser.writer.write_all(key)?;
        self.ser.writer.write_all("=\"")?;
        self.ser
            .escaper
            .escape_attr_value_quot(value, &mut self.ser.writer)?;
        self.ser.writer.write_all("\"")?;
        Ok(self)
    }

    /// Write a namespace declaration, `xmlns` for `None`
    pub fn namespace(self, prefix: Option<&str>, uri: &str) -> io::Result<Self> {
        match prefix {
            Some(prefix) => {
                let key = format!("xmlns:{}", prefix);
                self.attribute(&key, uri)
            }
            None => self.attribute("xmlns", uri),
        }
    }

    pub fn finish(self) -> io::Result<()> {
        self.ser.stack.push(self.name);
        self.ser.writer.write_all(">")
    }

    pub fn finish_empty(self) -> io::Result<()> {
        if self.ser.stack.is_empty() {
            self.ser.state = State::Epilog;
        }
        self.ser.writer.write_all("/>")
    }
}

#[cfg(test)]
mod tests {
    use crate::escape::DefaultEscaper;

    use super::*;

    #[test]
    fn test_empty() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer.element("xns")?.finish_empty()?;
        xml_writer.finish()?;

        assert_eq!("<xns/>", &writer);

        Ok(())
    }

    #[test]
    fn test_namespaces() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer
            .element("root")?
            .namespace(None, "urn:core")?
            .namespace(Some("ns1"), "urn:xhtml")?
            .finish()?;
        xml_writer.element("ns1:p")?.finish_empty()?;
        xml_writer.end_element()?;
        xml_writer.finish()?;

        assert_eq!(
            r#"<root xmlns="urn:core" xmlns:ns1="urn:xhtml"><ns1:p/></root>"#,
            &writer
        );

        Ok(())
    }

    #[test]
    fn test_nested_content() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer.element("x")?.attribute("a", "<")?.finish()?;
        xml_writer.element("y")?.finish()?;
        xml_writer.characters("abc <")?;
        xml_writer.end_element()?;
        xml_writer.comment(" note ")?;
        xml_writer.end_element()?;

        assert_eq!(r#"<x a="&lt;"><y>abc &lt;</y><!-- note --></x>"#, &writer);

        Ok(())
    }

    #[test]
    fn test_unclosed() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer.element("x")?.finish()?;

        assert!(xml_writer.finish().is_err());
        Ok(())
    }

    #[test]
    fn test_second_root() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer.element("x")?.finish_empty()?;

        assert!(xml_writer.element("y").is_err());
        Ok(())
    }

    #[test]
    fn test_stack_underflow() {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);

        assert!(xml_writer.end_element().is_err());
    }

    #[test]
    fn test_illegal_comment() -> io::Result<()> {
        let mut writer = String::new();
        let mut xml_writer = XmlWriter::for_writer(&mut writer, DefaultEscaper);
        xml_writer.element("x")?.finish()?;

        assert!(xml_writer.comment("a--b").is_err());
        Ok(())
    }
}
