pub trait XmlByteExt {
    fn is_xml_whitespace(&self) -> bool;
}

impl XmlByteExt for u8 {
    fn is_xml_whitespace(&self) -> bool {
        matches!(*self, b'\t' | b'\n' | b'\r' | b' ')
    }
}

impl XmlByteExt for char {
    fn is_xml_whitespace(&self) -> bool {
        matches!(*self, '\t' | '\n' | '\r' | ' ')
    }
}

pub trait XmlStrExt {
    /// `true` for the empty string too
    fn only_xml_whitespace(&self) -> bool;

    /// Strip leading and trailing `S` production characters
    fn trim_xml_whitespace(&self) -> &str;
}

impl XmlStrExt for str {
    fn only_xml_whitespace(&self) -> bool {
        self.bytes().all(|b| b.is_xml_whitespace())
    }

    fn trim_xml_whitespace(&self) -> &str {
        self.trim_matches(|c: char| c.is_xml_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only() {
        assert!("".only_xml_whitespace());
        assert!(" \t\r\n".only_xml_whitespace());
        assert!(!" x ".only_xml_whitespace());
        // NBSP is not XML whitespace
        assert!(!"\u{a0}".only_xml_whitespace());
    }

    #[test]
    fn trim() {
        assert_eq!("xs:string", "\n  xs:string\t".trim_xml_whitespace());
        assert_eq!("\u{a0}a", "\u{a0}a ".trim_xml_whitespace());
    }
}
