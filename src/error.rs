//! Module containing error details.

/// The input template is malformed and no extraction result could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTemplate {
	/// The byte offset within the input where the error occurs.
	///
	/// What exactly this points to depends on the [`Reason`].
	pub position: usize,

	/// The length in bytes of the offending source text.
	pub len: usize,

	/// Why the template was rejected.
	pub reason: Reason,
}

/// The reason a template was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
	/// A closing brace (`}`) appears outside of a field and is not doubled.
	///
	/// The position points to the closing brace.
	UnbalancedBrace,

	/// A parenthesis or bracket inside a field is not balanced.
	///
	/// The position points to the closing character that does not match,
	/// or to the character following a parenthesized argument if that is neither `:` nor `}`.
	UnbalancedParen,

	/// A field has no argument text (`"{}"`, `"{ :x}"` or `"{()}"`).
	///
	/// The position points to the opening brace, and the length covers the whole field.
	EmptyArgument,

	/// The input ends before the field is closed.
	///
	/// The position points to the opening brace of the field.
	UnterminatedField,

	/// A field contains another field (`"{a{b}}"` or `"{x:{width}}"`).
	///
	/// The position points to the inner opening brace.
	NestedFieldNotAllowed,
}

impl Reason {
	/// Get a human readable description of the reason.
	pub fn message(&self) -> &'static str {
		match self {
			Self::UnbalancedBrace => "Unmatched closing brace",
			Self::UnbalancedParen => "Unbalanced parenthesis or bracket",
			Self::EmptyArgument => "Empty argument in substitution field",
			Self::UnterminatedField => "Unterminated substitution field",
			Self::NestedFieldNotAllowed => "Nested substitution field is not allowed",
		}
	}
}

impl std::fmt::Display for Reason {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.message())
	}
}

impl MalformedTemplate {
	/// Create an error that covers a single character of the source.
	pub(crate) fn at_char(source: &str, position: usize, reason: Reason) -> Self {
		let len = source[position..].chars().next().map_or(1, char::len_utf8);
		Self { position, len, reason }
	}

	/// Get the range in the source text that contains the error.
	pub fn source_range(&self) -> std::ops::Range<usize> {
		self.position..self.position + self.len
	}

	/// Get the line of source that contains the error.
	///
	/// # Panics
	/// May panic if the source text is not the original source that contains the error.
	pub fn source_line<'a>(&self, source: &'a str) -> &'a str {
		let position = self.position;
		let start = line_start(source, position);
		let end = line_end(source, position);
		&source[start..end]
	}

	/// Write source highlighting for the error location.
	///
	/// The highlighting ends with a newline.
	///
	/// Note: this function doesn't print anything if the source line exceeds 60 characters in width.
	/// For more control over this behaviour, consider using [`Self::source_range()`] and [`Self::source_line()`] instead.
	pub fn write_source_highlighting(&self, f: &mut impl std::fmt::Write, source: &str) -> std::fmt::Result {
		use unicode_width::UnicodeWidthStr;

		let line_start = line_start(source, self.position);
		let line = self.source_line(source);
		if line.width() > 60 {
			return Ok(());
		}

		// Errors that span multiple lines are only underlined up to the end of the first line.
		let range = self.source_range();
		let start = range.start - line_start;
		let end = (range.end - line_start).min(line.len());
		write!(f, "  {}\n  ", line)?;
		write_underline(f, line, start..end)?;
		writeln!(f)
	}

	/// Get source highlighting for the error location as a string.
	///
	/// The highlighting ends with a newline.
	pub fn source_highlighting(&self, source: &str) -> String {
		let mut output = String::new();
		// Writing to a String never fails.
		let _ = self.write_source_highlighting(&mut output, source);
		output
	}
}

impl std::error::Error for MalformedTemplate {}

impl std::fmt::Display for MalformedTemplate {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{} at byte offset {}", self.reason, self.position)
	}
}

fn line_start(source: &str, position: usize) -> usize {
	match source.as_bytes()[..position].iter().rposition(|&c| c == b'\n' || c == b'\r') {
		Some(line_end) => line_end + 1,
		None => 0,
	}
}

fn line_end(source: &str, position: usize) -> usize {
	match source.as_bytes()[position..].iter().position(|&c| c == b'\n' || c == b'\r') {
		Some(line_end) => position + line_end,
		None => source.len(),
	}
}

fn write_underline(f: &mut impl std::fmt::Write, line: &str, range: std::ops::Range<usize>) -> std::fmt::Result {
	use unicode_width::UnicodeWidthStr;
	let spaces = line[..range.start].width();
	let carets = line[range].width().max(1);
	write!(f, "{}", " ".repeat(spaces))?;
	write!(f, "{}", "^".repeat(carets))?;
	Ok(())
}
