//! XML primitives for PAN-OS configuration documents.
//!
//! Provides a generic [`XmlNode`] tree with helpers for the PAN-OS
//! `<entry name=".."/>` and `<member>` conventions, a parser and writer built
//! on `quick-xml`, the API response envelope, and the JSON rendering used for
//! reporting rule sets.

pub mod json;
pub mod parser;
pub mod response;
pub mod tree;
pub mod writer;

pub use json::to_json;
pub use parser::{parse, parse_file, parse_str, ParseError};
pub use response::{unwrap_response, ApiError};
pub use tree::XmlNode;
pub use writer::{write, write_document, write_file, WriteError};
