mod parse;
mod render;

pub use render::Render;

/// Raw template that doesn't track the original source.
///
/// Internally, this keeps a bunch of offsets into the original source.
#[derive(Clone)]
pub struct Template {
	/// The individual parts that make up the template.
	parts: Vec<Part>,
}

/// One piece of a parsed template.
#[derive(Clone)]
pub enum Part {
	/// A literal string to be used verbatim from the original source.
	Literal(Literal),

	/// A doubled brace (`{{` or `}}`).
	EscapedBrace(EscapedBrace),

	/// A substitution field.
	Field(Field),
}

/// A literal string to be used verbatim from the original source.
#[derive(Clone)]
pub struct Literal {
	/// The range of the literal in the original source.
	///
	/// The literal can not contain any braces.
	range: std::ops::Range<usize>,
}

/// A doubled brace.
///
/// Will be copied to the residual template as both characters.
#[derive(Clone)]
pub struct EscapedBrace {
	/// The brace character, either `{` or `}`.
	brace: char,
}

/// A substitution field.
#[derive(Clone)]
pub struct Field {
	/// The range of the whole field in the source, including both braces.
	pub(super) range: std::ops::Range<usize>,

	/// The range of the argument text in the source.
	pub(super) argument: std::ops::Range<usize>,

	/// The range of the format spec in the source, without the delimiting colon.
	///
	/// `None` if the field has no delimiting colon at all.
	pub(super) format_spec: Option<std::ops::Range<usize>>,
}

impl Template {
	/// Iterate over the substitution fields in order of appearance.
	pub fn fields(&self) -> impl Iterator<Item = &Field> {
		self.parts.iter().filter_map(|part| match part {
			Part::Field(field) => Some(field),
			_ => None,
		})
	}
}
