//! The capability every archived value implements.

use std::any::Any;
use std::fmt;

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::{ArchiveError, Result};

/// Separator between tags in a serialized type hierarchy.
pub const HIERARCHY_SEPARATOR: char = ',';

/// Upcasting helper so archived values can be downcast after resolution.
///
/// Implemented for every `'static` type; implementors of [`Archivable`] never
/// write it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A value that can be written to and read back from an archive.
///
/// The type hierarchy lists the value's own tag first, followed by every
/// ancestor tag it may be read back as. Hierarchies are append-only: tags are
/// never renamed or removed once data has been written with them.
///
/// # Example
///
/// ```
/// use bt_archive::{Archivable, ArchiveReader, ArchiveWriter, Result};
///
/// #[derive(Debug, Default)]
/// struct Tick {
///     price: Option<f64>,
/// }
///
/// impl Archivable for Tick {
///     fn type_hierarchy(&self) -> &'static [&'static str] {
///         &["Tick"]
///     }
///
///     fn prototype(&self) -> Box<dyn Archivable> {
///         Box::new(Tick::default())
///     }
///
///     fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
///         out.write_f64("price", self.price)
///     }
///
///     fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
///         self.price = input.read_f64("price")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Archivable: AsAny + fmt::Debug + Send + Sync {
    /// Ordered type tags, most specific first.
    fn type_hierarchy(&self) -> &'static [&'static str];

    /// A fresh zero value of the same concrete variant.
    fn prototype(&self) -> Box<dyn Archivable>;

    /// Write this value's fields.
    fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()>;

    /// Read this value's fields, overwriting the current ones.
    fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()>;
}

impl dyn Archivable {
    /// The most specific type tag, or `""` for an empty hierarchy.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        self.type_hierarchy().first().copied().unwrap_or("")
    }

    /// Whether the concrete type is `T`.
    #[must_use]
    pub fn is<T: Archivable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as the concrete type `T`.
    #[must_use]
    pub fn downcast_ref<T: Archivable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as the concrete type `T`.
    #[must_use]
    pub fn downcast_mut<T: Archivable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Convert into the concrete type `T`.
    #[must_use]
    pub fn downcast<T: Archivable>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

/// Check that a tag can be stored in a hierarchy string and an XML attribute.
pub(crate) fn validate_tag(tag: &str) -> Result<()> {
    let valid = !tag.is_empty()
        && !tag
            .chars()
            .any(|c| c == HIERARCHY_SEPARATOR || c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '&' | '"'));
    if valid {
        Ok(())
    } else {
        Err(ArchiveError::InvalidTypeTag {
            tag: tag.to_string(),
        })
    }
}

/// Join a type hierarchy into its serialized form (`"Derived,Base"`).
pub fn join_hierarchy(tags: &[&str]) -> Result<String> {
    if tags.is_empty() {
        return Err(ArchiveError::InvalidTypeTag { tag: String::new() });
    }
    for tag in tags {
        validate_tag(tag)?;
    }
    Ok(tags.join(","))
}

/// Split a serialized type hierarchy into its tags, most specific first.
///
/// The split is exact: no trimming, and empty tags are kept so readers can
/// reject hierarchies a writer would never produce.
pub fn split_hierarchy(hierarchy: &str) -> impl Iterator<Item = &str> {
    hierarchy.split(HIERARCHY_SEPARATOR)
}

/// Check that a serialized hierarchy is one [`join_hierarchy`] could have written.
pub(crate) fn check_hierarchy(hierarchy: &str) -> Result<()> {
    split_hierarchy(hierarchy).try_for_each(validate_tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        value: i32,
    }

    impl Archivable for Probe {
        fn type_hierarchy(&self) -> &'static [&'static str] {
            &["Probe", "Base"]
        }

        fn prototype(&self) -> Box<dyn Archivable> {
            Box::new(Probe::default())
        }

        fn write_fields(&self, out: &mut dyn ArchiveWriter) -> Result<()> {
            out.write_i32("value", self.value)
        }

        fn read_fields(&mut self, input: &mut dyn ArchiveReader) -> Result<()> {
            self.value = input.read_i32("value")?;
            Ok(())
        }
    }

    #[test]
    fn test_join_and_split() {
        let joined = join_hierarchy(&["Derived", "Base"]).unwrap();
        assert_eq!(joined, "Derived,Base");
        let tags: Vec<&str> = split_hierarchy(&joined).collect();
        assert_eq!(tags, vec!["Derived", "Base"]);
    }

    #[test]
    fn test_split_is_exact() {
        let tags: Vec<&str> = split_hierarchy(" A ,,B").collect();
        assert_eq!(tags, vec![" A ", "", "B"]);

        assert!(check_hierarchy("Derived,Base").is_ok());
        for bad in ["", "Derived,,Base", " A ", "Derived,", ",Base", "Bell\u{7}"] {
            assert!(
                matches!(check_hierarchy(bad), Err(ArchiveError::InvalidTypeTag { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_invalid_tags() {
        assert!(join_hierarchy(&[]).is_err());
        assert!(join_hierarchy(&["Has,Comma"]).is_err());
        assert!(join_hierarchy(&["Has Space"]).is_err());
        assert!(join_hierarchy(&["Quote\""]).is_err());
        assert!(join_hierarchy(&["Ok", ""]).is_err());
    }

    #[test]
    fn test_downcast() {
        let boxed: Box<dyn Archivable> = Box::new(Probe { value: 7 });
        assert_eq!(boxed.type_tag(), "Probe");
        assert!(boxed.is::<Probe>());
        assert_eq!(boxed.downcast_ref::<Probe>(), Some(&Probe { value: 7 }));
        assert_eq!(boxed.downcast::<Probe>().map(|p| p.value), Some(7));
    }

    #[test]
    fn test_prototype_is_fresh() {
        let original = Probe { value: 42 };
        let fresh = original.prototype();
        assert_eq!(fresh.downcast_ref::<Probe>(), Some(&Probe::default()));
    }
}
