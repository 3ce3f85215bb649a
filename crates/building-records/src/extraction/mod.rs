//! XML-to-row extraction for Building Record filings

mod extractor;
mod schema;
mod tree;

pub use extractor::{extract, title_case, Extractor, WORK_ITEM_SEPARATOR};
pub use schema::{
    parse_uprn, BuildingRecordDocument, BuildingRecordElement, ContactDetails, GlobalDetails,
    RecordDetails, StatusDetails, WorkAddress, WorkAddressDetails, WorkDescription, WorkDetails,
};
pub use tree::{parse_document, XmlElement, DEFAULT_MAX_DEPTH};
