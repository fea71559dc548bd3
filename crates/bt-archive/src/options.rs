//! Reader and writer options.

/// Default limit on nested transactions.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default XML root element name.
pub const DEFAULT_ROOT_NAME: &str = "document";

/// Options for reading binary archives.
#[derive(Debug, Clone)]
pub struct BinaryReaderOptions {
    /// Maximum transaction nesting depth (default: 128).
    pub max_depth: usize,
    /// Accept unread bytes after the root object (default: false).
    pub allow_trailing_bytes: bool,
}

impl Default for BinaryReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing_bytes: false,
        }
    }
}

impl BinaryReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Accept unread bytes after the root object.
    #[must_use]
    pub fn allow_trailing_bytes(mut self) -> Self {
        self.allow_trailing_bytes = true;
        self
    }
}

/// Options for writing binary archives.
#[derive(Debug, Clone)]
pub struct BinaryWriterOptions {
    /// Maximum transaction nesting depth (default: 128).
    pub max_depth: usize,
    /// Bytes reserved up front in the output buffer (default: 256).
    pub initial_capacity: usize,
}

impl Default for BinaryWriterOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            initial_capacity: 256,
        }
    }
}

impl BinaryWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the initial buffer capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// Options for writing XML archives.
#[derive(Debug, Clone)]
pub struct XmlWriterOptions {
    /// Root element name (default: "document").
    pub root_name: String,
    /// Spaces per indentation level, `None` for compact output (default: 2).
    pub indent: Option<usize>,
    /// Maximum element nesting depth (default: 128).
    pub max_depth: usize,
}

impl Default for XmlWriterOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            indent: Some(2),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root element name.
    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Set the indentation width.
    #[must_use]
    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    /// Render without indentation or line breaks.
    #[must_use]
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Options for reading XML archives.
#[derive(Debug, Clone)]
pub struct XmlReaderOptions {
    /// Expected root element name (default: "document").
    pub root_name: String,
    /// Maximum element nesting depth (default: 128).
    pub max_depth: usize,
}

impl Default for XmlReaderOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected root element name.
    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
