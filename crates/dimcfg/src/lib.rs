//! # dimcfg - dimensional configuration
//!
//! Expand one annotated tree into one rendered tree (a *product*) per valid combination of user defined
//! *dimensions*.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `dimcfg` works internally.
//!
//! ### Terms
//!
//! - a `dimension` is an axis of variation, declared by a top-level key `name/brackets`
//! - a `register` is an independent slot within a dimension (`R0`, `R1`, ...)
//! - a `domain` is a named group of values within a register
//! - an `item` assigns values to one `(register, domain)` and may be gated by `conditions`
//! - a `tuple` selects one `(domain, value)` per register per dimension
//!
//! This is a valid document:
//! ```yaml
//! env/[[]]:
//!   dev: [local]
//!   prod: [eu1, us1]
//!
//! # only available in production
//! tier/<>:
//!   "-[[prod]]":
//!     gold: [g]
//!   basic: [b]
//!
//! url[[prod]]: "https://[[@]].example.com"
//! url[[dev]]: "http://localhost"
//! plan<gold>: premium
//! ```
//!
//! ### Loading
//!
//! The engine is parser agnostic and only sees a [value::Value]. [source] has helpers for YAML and
//! JSON, loading files is left to the caller.
//!
//! ### Parsing
//!
//! see [document::Document::parse]
//!
//! Dimension declarations are parsed first, in document order. Their bracket markers are split in a left
//! and a right half (`[[]]` → `[[`, `]]`). Keys inside a declaration may carry annotations of dimensions
//! declared *before* it, which turn into [dimension::Condition]s on the declared items.
//!
//! Dimensions are kept sorted by descending bracket length so that `[[` is tried before `[` when
//! scanning keys ([key_expression::parse_key]).
//!
//! The remaining keys become the property [tree::Tree]. Every map entry keeps its clean key and the
//! conditions extracted from its annotations.
//!
//! ### Filtering
//!
//! see [Config::filter]
//!
//! Filters (`env=prod`, `env=prod.eu1`, `env=:zone`) intersect the items of the dimension they name.
//! Afterwards every dimension re-validates its conditions against the current values of the dimensions it
//! depends on, so filtering `env` can remove items of `tier`.
//!
//! ### Generation
//!
//! see [Config::generate]
//!
//! A cartesian product over dimensions and, within each dimension, over registers. Items whose
//! conditions do not hold for the tuple built so far are skipped.
//!
//! | tuple             | url                           | plan      |
//! |-------------------|-------------------------------|-----------|
//! | `env=dev.local`   | `http://localhost`            | -         |
//! | `env=prod.eu1`    | `https://eu1.example.com`     | `premium` |
//!
//! _Note: `tier` is omitted from the table. It multiplies the `prod` rows._
//!
//! ### Rendering
//!
//! see [Config::render]
//!
//! Entries whose conditions fail are skipped, scalar strings are interpolated
//! ([interpolate::interpolate]) and the result is a plain [value::Value] which serializes via [serde].
//!
pub mod algebra;
mod config;
pub mod dimension;
pub mod document;
mod error;
pub mod expression;
pub mod interpolate;
pub mod key_expression;
pub mod source;
pub mod tree;
pub mod tuple;
pub mod value;

pub use config::{Config, Options};
pub use error::{Error, Result};
pub use tuple::{Product, Tuple};
