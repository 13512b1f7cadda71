use crate::dom::Document;

pub mod quick_xml;
mod scope;

pub trait DomReader {
    type Error;

    fn parse(self) -> Result<Document, Self::Error>;
}
