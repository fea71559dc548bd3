//! Version-tolerant object archives for backtesting state.
//!
//! Values implement [`Archivable`] once and can then be written to, and read
//! back from, either of two encodings:
//!
//! - **Binary**: a compact big-endian stream where every object is
//!   length-prefixed, so readers skip fields they do not know.
//! - **XML**: an element tree where every field is a named child element.
//!
//! Objects are polymorphic. Each carries its type hierarchy (most specific tag
//! first), and readers instantiate the first tag their [`TypeRegistry`]
//! knows. Old readers therefore fall back to an ancestor type when they meet
//! data from a newer writer, and new readers accept old data unchanged.
//!
//! # Example
//!
//! ```
//! use bt_archive::{Archivable, ArchiveReader, ArchiveWriter, Result, TypeRegistry, binary};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Fill {
//!     quantity: i32,
//!     price: Option<f64>,
//! }
//!
//! impl Archivable for Fill {
//!     fn type_hierarchy(&self) -> &'static [&'static str] {
//!         &["Fill"]
//!     }
//!
//!     fn prototype(&self) -> Box<dyn Archivable> {
//!         Box::new(Fill::default())
//!     }
//!
//!     fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
//!         out.write_i32("quantity", self.quantity)?;
//!         out.write_f64("price", self.price)
//!     }
//!
//!     fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
//!         self.quantity = input.read_i32("quantity")?;
//!         self.price = input.read_f64("price")?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut registry = TypeRegistry::new();
//! registry.register::<Fill>()?;
//!
//! let fill = Fill { quantity: 100, price: Some(101.25) };
//! let bytes = binary::to_bytes(Some(&fill))?;
//! let decoded = binary::from_bytes(&bytes, &registry)?.and_then(|v| v.downcast::<Fill>());
//! assert_eq!(decoded.as_deref(), Some(&fill));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `archive.rs` - Typed writer/reader traits and the substrate capabilities behind them
//! - `object.rs` - Object protocol shared by both encodings
//! - `registry.rs` - Type tag to prototype mapping
//! - `binary/` - Length-prefixed byte stream encoding
//! - `xml/` - Element tree encoding
//! - `io.rs` - Whole-file reads and atomic writes

mod archivable;
mod archive;
pub mod binary;
pub mod calendar;
mod error;
mod io;
mod object;
mod options;
mod registry;
mod scalar;
pub mod xml;

pub use archivable::{Archivable, AsAny, HIERARCHY_SEPARATOR, join_hierarchy, split_hierarchy};
pub use archive::{ArchiveReader, ArchiveWriter, FrameKind, ReadSubstrate, WriteSubstrate};
pub use error::{ArchiveError, ErrorCategory, Result};
pub use io::{read_binary_file, read_xml_file, write_binary_file, write_xml_file};
pub use object::{COUNT_FIELD, ITEM_FIELD, ROOT_FIELD};
pub use options::{
    BinaryReaderOptions, BinaryWriterOptions, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_NAME,
    XmlReaderOptions, XmlWriterOptions,
};
pub use registry::TypeRegistry;
pub use scalar::{Scalar, ScalarKind, ScalarValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
