use crate::error::MalformedTemplate;
use crate::Extraction;

mod raw;
use raw::Render;

/// A parsed template that borrows the source string.
///
/// You can parse the template once and then inspect the [fields][Self::fields()],
/// render the [residual template][Self::residual()] or collect the [arguments][Self::arguments()].
///
/// This template borrows the source string.
/// You can use [`TemplateBuf`] if you need a template that owns the source string.
#[derive(Clone)]
pub struct Template<'a> {
	source: &'a str,
	raw: raw::Template,
}

impl std::fmt::Debug for Template<'_> {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Template").field(&self.source).finish()
	}
}

impl PartialEq for Template<'_> {
	/// Templates are equal if their source strings are equal.
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for Template<'_> {}

impl<'a> Template<'a> {
	/// Parse a template from a string slice.
	///
	/// Fields have the form `{argument}` or `{argument:format-spec}`.
	/// The argument ends at the first colon that is not nested in brackets or quotes and not part of `::`.
	/// Wrap the argument in parentheses (`{(a ? b : c)}`) if it contains such a colon itself.
	///
	/// Use `{{` and `}}` for literal braces.
	#[inline]
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(source: &'a str) -> Result<Self, MalformedTemplate> {
		let raw = raw::Template::parse(source).map_err(|e| {
			tracing::debug!(position = e.position, reason = %e.reason, "rejected malformed template");
			e
		})?;
		Ok(Self { source, raw })
	}

	/// Get the original source string.
	#[inline]
	pub fn source(&self) -> &'a str {
		self.source
	}

	/// Iterate over the substitution fields in order of appearance.
	pub fn fields(&self) -> impl Iterator<Item = Field<'a>> + '_ {
		let source = self.source;
		self.raw.fields().map(move |raw| Field::new(source, raw))
	}

	/// Get the number of substitution fields.
	pub fn field_count(&self) -> usize {
		self.raw.fields().count()
	}

	/// Render the residual template.
	///
	/// Each field is reduced to `{}`, or to `{:format-spec}` if it has a non-empty format spec.
	/// Literal text and doubled braces are kept unchanged.
	pub fn residual(&self) -> String {
		let mut output = String::with_capacity(self.source.len());
		self.raw.render(&mut output, self.source);
		output
	}

	/// Get the argument text of all fields in order of appearance.
	pub fn arguments(&self) -> Vec<&'a str> {
		self.fields().map(|field| field.argument()).collect()
	}

	/// Split the template into the residual template and the argument list.
	pub fn extract(&self) -> Extraction {
		Extraction {
			template: self.residual(),
			arguments: self.fields().map(|field| field.argument().to_owned()).collect(),
		}
	}
}

/// A parsed template that owns the source string.
///
/// This template owns the source string.
/// If you do not need ownership, you can also use [`Template`] to borrow it instead.
#[derive(Clone)]
pub struct TemplateBuf {
	source: String,
	raw: raw::Template,
}

impl std::fmt::Debug for TemplateBuf {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("TemplateBuf").field(&self.source).finish()
	}
}

impl PartialEq for TemplateBuf {
	/// Templates are equal if their source strings are equal.
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for TemplateBuf {}

impl TemplateBuf {
	/// Parse a template from a string.
	///
	/// This takes ownership of the string.
	/// See [`Template::from_str()`] for the template syntax.
	#[inline]
	pub fn from_string(source: String) -> Result<Self, MalformedTemplate> {
		let raw = Template::from_str(&source)?.raw;
		Ok(Self { source, raw })
	}

	/// Get the original source string.
	#[inline]
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Consume the template to get the original source string.
	#[inline]
	pub fn into_source(self) -> String {
		self.source
	}

	/// Get a borrowing [`Template`] for this template.
	///
	/// This clones the parsed representation, but not the source string.
	#[inline]
	pub fn as_template(&self) -> Template<'_> {
		Template {
			source: &self.source,
			raw: self.raw.clone(),
		}
	}

	/// Iterate over the substitution fields in order of appearance.
	pub fn fields(&self) -> impl Iterator<Item = Field<'_>> + '_ {
		let source = self.source.as_str();
		self.raw.fields().map(move |raw| Field::new(source, raw))
	}

	/// Get the number of substitution fields.
	pub fn field_count(&self) -> usize {
		self.raw.fields().count()
	}

	/// Render the residual template.
	///
	/// See [`Template::residual()`].
	pub fn residual(&self) -> String {
		let mut output = String::with_capacity(self.source.len());
		self.raw.render(&mut output, &self.source);
		output
	}

	/// Get the argument text of all fields in order of appearance.
	pub fn arguments(&self) -> Vec<&str> {
		self.fields().map(|field| field.argument()).collect()
	}

	/// Split the template into the residual template and the argument list.
	pub fn extract(&self) -> Extraction {
		Extraction {
			template: self.residual(),
			arguments: self.fields().map(|field| field.argument().to_owned()).collect(),
		}
	}
}

impl<'a> From<&'a TemplateBuf> for Template<'a> {
	#[inline]
	fn from(other: &'a TemplateBuf) -> Self {
		other.as_template()
	}
}

impl From<&Template<'_>> for TemplateBuf {
	#[inline]
	fn from(other: &Template<'_>) -> Self {
		other.clone().into()
	}
}

impl From<Template<'_>> for TemplateBuf {
	#[inline]
	fn from(other: Template<'_>) -> Self {
		Self {
			source: other.source.to_owned(),
			raw: other.raw,
		}
	}
}

/// A substitution field in a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
	range: std::ops::Range<usize>,
	argument: &'a str,
	format_spec: Option<&'a str>,
}

impl<'a> Field<'a> {
	fn new(source: &'a str, raw: &raw::Field) -> Self {
		Self {
			range: raw.range.clone(),
			argument: &source[raw.argument.clone()],
			format_spec: raw.format_spec.clone().map(|x| &source[x]),
		}
	}

	/// The byte offset of the opening brace of the field.
	#[inline]
	pub fn start(&self) -> usize {
		self.range.start
	}

	/// The byte offset just past the closing brace of the field.
	#[inline]
	pub fn end(&self) -> usize {
		self.range.end
	}

	/// The byte range of the whole field in the source, including both braces.
	#[inline]
	pub fn range(&self) -> std::ops::Range<usize> {
		self.range.clone()
	}

	/// The argument text.
	///
	/// For a parenthesized argument, this is everything between the parentheses, verbatim.
	/// Otherwise, surrounding whitespace is trimmed.
	#[inline]
	pub fn argument(&self) -> &'a str {
		self.argument
	}

	/// The format spec, without the delimiting colon.
	///
	/// Empty if the field has no format spec.
	#[inline]
	pub fn format_spec(&self) -> &'a str {
		self.format_spec.unwrap_or("")
	}

	/// Check if the field has a delimiting colon, even if the format spec after it is empty.
	#[inline]
	pub fn has_format_spec(&self) -> bool {
		self.format_spec.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert2::{assert, check, let_assert};

	#[test]
	fn test_fields() {
		let_assert!(Ok(template) = Template::from_str("x = {x:>4}, y = {(a ? b : c)}"));
		check!(template.field_count() == 2);

		let fields: Vec<_> = template.fields().collect();
		assert!(fields.len() == 2);
		check!(fields[0].range() == (4..10));
		check!(fields[0].argument() == "x");
		check!(fields[0].format_spec() == ">4");
		check!(fields[0].has_format_spec());
		check!(fields[1].start() == 16);
		check!(fields[1].end() == 29);
		check!(fields[1].argument() == "a ? b : c");
		check!(fields[1].format_spec() == "");
		check!(!fields[1].has_format_spec());
	}

	#[test]
	fn test_empty_format_spec() {
		let_assert!(Ok(template) = Template::from_str("{x:}"));
		let_assert!(Some(field) = template.fields().next());
		check!(field.has_format_spec());
		check!(field.format_spec() == "");
		check!(template.residual() == "{}");
	}

	#[test]
	fn test_residual_and_arguments() {
		let_assert!(Ok(template) = Template::from_str("{{{a}}} = {b:#06x}"));
		check!(template.residual() == "{{{}}} = {:#06x}");
		check!(template.arguments() == ["a", "b"]);
	}

	#[test]
	fn test_template_buf() {
		let source = "Hello {name}!";
		let_assert!(Ok(buf1) = TemplateBuf::from_string(source.into()));
		let buf2 = buf1.clone();
		check!(buf1.into_source() == source);
		check!(buf2.source() == source);
		check!(buf2.field_count() == 1);
		check!(buf2.residual() == "Hello {}!");
		check!(buf2.arguments() == ["name"]);
		check!(buf2.as_template().extract() == buf2.extract());
	}

	#[test]
	fn test_template_buf_from_template() {
		let source = String::from("{a}-{b}");
		let_assert!(Ok(template) = Template::from_str(&source));
		let buf = TemplateBuf::from(&template);
		drop(template);
		drop(source);
		check!(buf.arguments() == ["a", "b"]);
		check!(buf.residual() == "{}-{}");
	}

	#[test]
	fn test_template_buf_rejects_malformed() {
		let_assert!(Err(e) = TemplateBuf::from_string("{unterminated".into()));
		check!(e.reason == crate::Reason::UnterminatedField);
	}

	#[test]
	fn test_debug() {
		let_assert!(Ok(template) = Template::from_str("{a}"));
		check!(format!("{template:?}") == "Template(\"{a}\")");
		let buf = TemplateBuf::from(template);
		check!(format!("{buf:?}") == "TemplateBuf(\"{a}\")");
	}
}
