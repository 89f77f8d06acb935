//! Errors raised while parsing, filtering, generating or rendering
//!
//! Every error aborts the whole call. Variants carry the dimension/key/register they refer to so callers
//! do not have to parse messages.
use crate::dimension::Register;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // grammar
    #[error("Dimension definition error: '{key}' must be of the form 'name/brackets' with a non-empty name")]
    MalformedDeclaration { key: String },
    #[error("Dimension definition error: brackets string must be symmetrical ({name}:{brackets})")]
    MalformedBrackets { name: String, brackets: String },
    #[error("Dimension definition error: brackets ambiguous ({name}:{brackets}), already used by '{existing}'")]
    AmbiguousBrackets {
        name: String,
        brackets: String,
        existing: String,
    },
    #[error("Dimension definition error: '{name}' is declared more than once")]
    DuplicateDimension { name: String },
    #[error("Parse error: unterminated annotation of dimension '{dimension}' in key '{key}'")]
    UnterminatedAnnotation { key: String, dimension: String },
    #[error("Parse error: garbage at the end of the key '{key}'")]
    TrailingGarbage { key: String },
    #[error("Dimension '{dimension}': initializer '{key}' must be a list of values or a mapping")]
    InvalidInitializer { dimension: String, key: String },
    #[error("Dimension '{dimension}': initializer '{key}' assigns a domain to values that already have one")]
    DomainRedeclared { dimension: String, key: String },
    #[error("Dimension '{dimension}': values below '{key}' are not assigned to any domain")]
    MissingDomain { dimension: String, key: String },
    #[error("Document root must be a mapping")]
    RootNotMapping,

    // expressions
    #[error("Expression error: comma not allowed ('{expression}')")]
    CommaInExpression { expression: String },
    #[error("Expression error: initializer key must name exactly one register ('{expression}')")]
    RegisterCount { expression: String },
    #[error("Filter error: incorrect format, expected 'dimension=expression' ('{filter}')")]
    MalformedFilter { filter: String },

    // references
    #[error("Filter error: dimension '{dimension}' is unknown")]
    UnknownDimension { dimension: String },
    #[error("Register {register} not found on dimension '{dimension}'")]
    UnknownRegister {
        dimension: String,
        register: Register,
    },
    #[error("Domain or value not found: '{value}', dimension: '{dimension}', register: {register}")]
    Unresolved {
        dimension: String,
        register: Register,
        value: String,
    },

    // rendering
    #[error("Empty value for dimension '{dimension}' ({register})")]
    EmptyInterpolation {
        dimension: String,
        register: Register,
    },
    #[error("Key '{key}' cannot be merged into a value that is not a mapping")]
    KeyIntoScalar { key: String },

    // context
    #[error("{source}\nkey: '{key}'")]
    Key {
        key: String,
        #[source]
        source: Box<Error>,
    },
    #[error("{source}\nfilter: '{filter}'")]
    Filter {
        filter: String,
        #[source]
        source: Box<Error>,
    },
    #[error("String interpolation error for value '{value}'\n{source}")]
    Interpolation {
        value: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn in_key(self, key: &str) -> Self {
        Error::Key {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_filter(self, filter: &str) -> Self {
        Error::Filter {
            filter: filter.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Key { source, .. }
            | Error::Filter { source, .. }
            | Error::Interpolation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
