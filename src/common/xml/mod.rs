//! XML text helpers shared by the part generators.

mod escape;

pub use escape::escape_xml;
