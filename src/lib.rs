//! Split brace-delimited format templates into a residual format string and argument expressions.
//!
//! This turns an interpolated string like `"{name} is {age:>3} years old"` into
//! the format string `"{} is {:>3} years old"` and the argument list `["name", "age"]`,
//! ready to be emitted as a call to a formatting function.
//!
//! # Syntax
//!
//! * Fields: `"Hello {name}!"`
//! * Format specs: `"{value:#06x}"`, passed through unmodified.
//! * Scoped names: `"{ns::value}"`, a `::` never splits a field.
//! * Parenthesized arguments: `"{(cond ? a : b)}"`, for arguments that contain a colon themselves.
//! * Literal braces: `"{{"` and `"}}"`.
//!
//! The argument ends at the *first* colon that is not part of `::`,
//! not nested in parentheses, brackets or braces, and not inside a quoted string.
//! Everything after that colon is the format spec.
//! This means that `"{cond ? a : b}"` is split into the argument `cond ? a` and the format spec ` b`.
//! Wrap such arguments in parentheses.
//!
//! Argument text is never interpreted as an expression.
//! It only needs to have balanced parentheses, brackets, braces and quotes.
//!
//! # Examples
//!
//! The [`extract()`][extract] function splits a `&str` in one go.
//!
//! ```
//! # fn main() -> Result<(), xstring::MalformedTemplate> {
//! let extraction = xstring::extract("{a}-{b}")?;
//! assert_eq!(extraction.template, "{}-{}");
//! assert_eq!(extraction.arguments, ["a", "b"]);
//!
//! let extraction = xstring::extract("value: {x:#06x}")?;
//! assert_eq!(extraction.template, "value: {:#06x}");
//! assert_eq!(extraction.arguments, ["x"]);
//! # Ok(())
//! # }
//! ```
//!
//! A [`Template`] can be used to inspect the individual fields.
//!
//! ```
//! # fn main() -> Result<(), xstring::MalformedTemplate> {
//! let template = xstring::Template::from_str("{now:%H:%M:%S}")?;
//! let field = template.fields().next().unwrap();
//! assert_eq!(field.argument(), "now");
//! assert_eq!(field.format_spec(), "%H:%M:%S");
//! # Ok(())
//! # }
//! ```
//!
//! Malformed templates are rejected with a [`MalformedTemplate`] error that points into the source.
//!
//! ```
//! let source = "Hello {name";
//! let error = xstring::extract(source).unwrap_err();
//! assert_eq!(error.reason, xstring::Reason::UnterminatedField);
//! assert_eq!(error.source_highlighting(source), "  Hello {name\n        ^\n");
//! ```
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(feature = "doc-cfg", feature(doc_cfg))]

pub mod error;
pub use error::{MalformedTemplate, Reason};

mod extraction;
pub use extraction::Extraction;

mod features;

mod template;
pub use template::*;

/// Split a template into the residual template and the argument list.
///
/// Fields have the form `{argument}` or `{argument:format-spec}`.
/// The residual template has each field replaced by `{}` or `{:format-spec}`,
/// and the arguments are returned in order of appearance.
///
/// Use `{{` and `}}` for literal braces.
/// They are kept as they are in the residual template.
///
/// See the [crate documentation][crate] for the exact rules to split argument and format spec.
pub fn extract(source: &str) -> Result<Extraction, MalformedTemplate> {
	Ok(Template::from_str(source)?.extract())
}
