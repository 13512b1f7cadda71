use std::io;

use xns_writer::escape::{DefaultEscaper, Escape};
use xns_writer::write::{UnicodeWrite, Utf8Writer};
use xns_writer::XmlWriter;

use crate::dom::{Document, NodeId, NodeKind};
use crate::error::{Error, Result};

enum Step {
    Open(NodeId),
    Close,
}

impl Document {
    /// Write the tree below the root element
    ///
    /// Namespace declarations are not synthesized: only `xmlns` attributes
    /// present on the elements are written. Elements without children are
    /// written as empty-element tags.
    pub fn write_to<W: UnicodeWrite, E: Escape>(&self, writer: &mut XmlWriter<'_, W, E>) -> Result<()> {
        let root = self.root().ok_or(Error::NoRootElement)?;

        let mut steps = vec![Step::Open(root)];
        while let Some(step) = steps.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close => {
                    writer.end_element()?;
                    continue;
                }
            };

            match self.kind(id) {
                NodeKind::Element(element) => {
                    let mut start = writer.element(element.name().qualified().into_owned())?;
                    for attr in element.attributes() {
                        start = start.attribute(&attr.name().qualified(), attr.value())?;
                    }

                    let children = self.children(id);
                    if children.is_empty() {
                        start.finish_empty()?;
                    } else {
                        start.finish()?;
                        steps.push(Step::Close);
                        steps.extend(children.iter().rev().map(|&child| Step::Open(child)));
                    }
                }
                NodeKind::Text(text) => writer.characters(text)?,
                NodeKind::CData(data) => writer.cdata(data)?,
                NodeKind::Comment(comment) => writer.comment(comment)?,
            }
        }

        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = String::new();
        let mut writer = XmlWriter::for_writer(&mut output, DefaultEscaper);
        self.write_to(&mut writer)?;
        writer.finish()?;
        Ok(output)
    }

    /// Write the document as UTF-8 into `sink` and hand it back
    pub fn write_xml<T: io::Write>(&self, sink: T) -> Result<T> {
        let mut sink = Utf8Writer::new(sink);
        let mut writer = XmlWriter::for_writer(&mut sink, DefaultEscaper);
        self.write_to(&mut writer)?;
        writer.finish()?;
        Ok(sink.into_inner())
    }
}
