use indexmap::IndexMap;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings read by the parsing engine.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    pub(crate) strict: bool,
    pub(crate) normalize_whitespace: bool,
    pub(crate) validate_output: bool,
    pub(crate) max_depth: usize,
    pub(crate) base: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig::strict()
    }
}

impl ParserConfig {
    pub fn strict() -> Self {
        ParserConfig {
            strict: true,
            normalize_whitespace: false,
            validate_output: true,
            max_depth: DEFAULT_MAX_DEPTH,
            base: None,
        }
    }

    /// Unknown `rdf:parseType` values, duplicate `rdf:ID`s and similar
    /// grammar violations are reported as warnings instead of errors.
    pub fn lenient() -> Self {
        ParserConfig {
            strict: false,
            ..ParserConfig::strict()
        }
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    pub fn validate_output(mut self, validate: bool) -> Self {
        self.validate_output = validate;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Settings read by the serialization engine.
#[derive(Clone, Debug)]
pub struct WriterConfig {
    pub(crate) indent: usize,
    pub(crate) prefixes: IndexMap<String, String>,
    pub(crate) base: Option<String>,
    pub(crate) emit_base: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig::all()
    }
}

impl WriterConfig {
    /// Compact output on a single line.
    pub fn none() -> Self {
        WriterConfig {
            indent: 0,
            prefixes: IndexMap::new(),
            base: None,
            emit_base: true,
        }
    }

    /// Pretty printed output, indented by four spaces.
    pub fn all() -> Self {
        WriterConfig {
            indent: 4,
            ..WriterConfig::none()
        }
    }

    /// Prefix to namespace bindings that take precedence over the
    /// built-in ones.
    pub fn prefix(mut self, prefixes: IndexMap<String, String>) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Whether the document base is declared with `xml:base` on the root.
    pub fn emit_base(mut self, emit: bool) -> Self {
        self.emit_base = emit;
        self
    }
}
