//! Dual serialization contract
//!
//! Every stateful object implements both:
//! - [`BinarySerialize`]: fixed-order little-endian stream
//! - [`XmlSerialize`]: one element per object, named after its type
//!
//! Loading either representation of the same state yields equal values.

mod binary;
mod error;
pub mod xml;

pub use binary::{BinaryReader, BinarySerialize, BinaryWriter, load_bytes, to_bytes};
pub use error::SerialError;
pub use xml::{XML_HEADER, XmlElement, XmlNode, XmlSerialize, load_xml_str};
