use std::{fmt, io};

/// Sink for already validated UTF-8 text
pub trait UnicodeWrite {
    fn write_all(&mut self, s: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        struct PersistErrorWrapper<'a, T: 'a + ?Sized> {
            writer: &'a mut T,
            err: Option<io::Error>,
        }

        impl<'a, T: 'a + ?Sized + UnicodeWrite> fmt::Write for PersistErrorWrapper<'a, T> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.writer.write_all(s).map_err(|err| {
                    self.err = Some(err);
                    fmt::Error
                })
            }
        }

        let mut writer = PersistErrorWrapper {
            writer: self,
            err: None,
        };
        fmt::write(&mut writer, fmt).map_err(|_| {
            writer
                .err
                .take()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "formatter error"))
        })
    }
}

impl UnicodeWrite for &mut String {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        fmt::write(&mut **self, fmt).map_err(|_| io::Error::new(io::ErrorKind::Other, "formatter error"))
    }
}

impl<T: ?Sized + UnicodeWrite> UnicodeWrite for &mut T {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        (**self).write_all(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        (**self).write_fmt(fmt)
    }
}

/// Adapter writing UTF-8 bytes into any [`io::Write`]
pub struct Utf8Writer<T: io::Write>(T);

impl<T: io::Write> Utf8Writer<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: io::Write> UnicodeWrite for Utf8Writer<T> {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.0.write_all(s.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        self.0.write_fmt(fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_sink() {
        let mut output = String::new();
        let mut sink = &mut output;
        sink.write_all("a").unwrap();
        sink.write_fmt(format_args!("{}:{}", "b", 1)).unwrap();
        assert_eq!("ab:1", output);
    }

    #[test]
    fn byte_sink() {
        let mut sink = Utf8Writer::new(Vec::new());
        sink.write_all("ä").unwrap();
        sink.write_fmt(format_args!("<{}>", "x")).unwrap();
        assert_eq!("ä<x>".as_bytes(), sink.into_inner().as_slice());
    }
}
