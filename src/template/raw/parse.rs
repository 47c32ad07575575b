use std::ops::Range;

use super::{EscapedBrace, Field, Literal, Part, Template};
use crate::error::{MalformedTemplate, Reason};

impl Template {
	/// Parse the template from a source string.
	///
	/// All ranges in the parsed template are byte offsets into `source`.
	pub fn parse(source: &str) -> Result<Self, MalformedTemplate> {
		let bytes = source.as_bytes();
		let mut parts = Vec::with_capacity(1);
		let mut finger = 0;
		while finger < bytes.len() {
			let next = match memchr::memchr2(b'{', b'}', &bytes[finger..]) {
				Some(x) => finger + x,
				None => bytes.len(),
			};

			// If we found a non-empty string up to the first brace,
			// then we have a piece of literal text.
			if next != finger {
				parts.push(Part::Literal(Literal { range: finger..next }));
			}

			// If we hit the end of the string, we're done.
			if next == bytes.len() {
				break;
			}

			let brace = bytes[next];
			if bytes.get(next + 1) == Some(&brace) {
				// A doubled brace is an escape, never a field boundary.
				parts.push(Part::EscapedBrace(EscapedBrace { brace: char::from(brace) }));
				finger = next + 2;
			} else if brace == b'}' {
				return Err(MalformedTemplate::at_char(source, next, Reason::UnbalancedBrace));
			} else {
				let field = Field::parse(source, next)?;
				let argument = &source[field.argument.clone()];
				tracing::trace!(start = field.range.start, end = field.range.end, argument, "found substitution field");
				finger = field.range.end;
				parts.push(Part::Field(field));
			}
		}

		Ok(Self { parts })
	}
}

impl Field {
	/// Parse a field from the source.
	///
	/// The `open` position must point to the opening brace of the field.
	fn parse(source: &str, open: usize) -> Result<Self, MalformedTemplate> {
		let body = &source[open + 1..];
		let first = source.len() - body.trim_start().len();
		if source.as_bytes().get(first) == Some(&b'(') {
			Self::parse_parenthesized(source, open, first)
		} else {
			Self::parse_bare(source, open)
		}
	}

	/// Parse a field whose argument is not wrapped in parentheses.
	///
	/// The argument runs up to the first standalone colon or the closing brace, whichever comes first.
	fn parse_bare(source: &str, open: usize) -> Result<Self, MalformedTemplate> {
		let bytes = source.as_bytes();
		let body_start = open + 1;
		let mut closers = Vec::new();
		let mut finger = body_start;
		while finger < bytes.len() {
			if closers.is_empty() {
				match bytes[finger] {
					b'{' => {
						return Err(MalformedTemplate::at_char(source, finger, Reason::NestedFieldNotAllowed));
					},
					b'}' => {
						let argument = trim(source, body_start..finger);
						return Self::new(source, open, argument, None, finger + 1);
					},
					b':' if is_standalone_colon(bytes, finger) => {
						let argument = trim(source, body_start..finger);
						let spec_start = finger + 1;
						let close = find_format_spec_end(source, open, spec_start)?;
						return Self::new(source, open, argument, Some(spec_start..close), close + 1);
					},
					_ => (),
				}
			}
			finger = step_nested(source, open, finger, &mut closers)?;
		}
		Err(unterminated(open))
	}

	/// Parse a field whose argument is wrapped in parentheses.
	///
	/// The `paren` position must point to the opening parenthesis.
	/// Everything between it and the matching closing parenthesis is the argument, verbatim.
	fn parse_parenthesized(source: &str, open: usize, paren: usize) -> Result<Self, MalformedTemplate> {
		let bytes = source.as_bytes();
		let mut closers = vec![b')'];
		let mut finger = paren + 1;
		loop {
			match bytes.get(finger) {
				None => return Err(unterminated(open)),
				Some(b')') if closers.len() == 1 => break,
				Some(_) => finger = step_nested(source, open, finger, &mut closers)?,
			}
		}

		let argument = paren + 1..finger;
		let after = finger + 1;
		match bytes.get(after) {
			Some(b'}') => Self::new(source, open, argument, None, after + 1),
			Some(b':') => {
				let spec_start = after + 1;
				let close = find_format_spec_end(source, open, spec_start)?;
				Self::new(source, open, argument, Some(spec_start..close), close + 1)
			},
			Some(_) => Err(MalformedTemplate::at_char(source, after, Reason::UnbalancedParen)),
			None => Err(unterminated(open)),
		}
	}

	/// Create a field spanning `open..end`, rejecting it if the argument is blank.
	fn new(
		source: &str,
		open: usize,
		argument: Range<usize>,
		format_spec: Option<Range<usize>>,
		end: usize,
	) -> Result<Self, MalformedTemplate> {
		if source[argument.clone()].trim().is_empty() {
			return Err(MalformedTemplate {
				position: open,
				len: end - open,
				reason: Reason::EmptyArgument,
			});
		}
		Ok(Self {
			range: open..end,
			argument,
			format_spec,
		})
	}
}

/// Advance over one element of a field body while tracking bracket nesting.
///
/// Quoted strings are skipped as a whole.
/// Returns the index of the next byte to look at.
fn step_nested(source: &str, open: usize, index: usize, closers: &mut Vec<u8>) -> Result<usize, MalformedTemplate> {
	let bytes = source.as_bytes();
	match bytes[index] {
		b'"' => skip_quoted(bytes, open, index),
		b'\'' if !is_digit_separator(bytes, index) => skip_quoted(bytes, open, index),
		b'(' => {
			closers.push(b')');
			Ok(index + 1)
		},
		b'[' => {
			closers.push(b']');
			Ok(index + 1)
		},
		b'{' => {
			closers.push(b'}');
			Ok(index + 1)
		},
		c @ (b')' | b']' | b'}') => {
			if closers.pop() == Some(c) {
				Ok(index + 1)
			} else {
				Err(MalformedTemplate::at_char(source, index, Reason::UnbalancedParen))
			}
		},
		_ => Ok(index + 1),
	}
}

/// Skip a quoted string starting at `index`.
///
/// Backslashes escape the next character.
/// Returns the index of the byte after the closing quote.
fn skip_quoted(bytes: &[u8], open: usize, index: usize) -> Result<usize, MalformedTemplate> {
	let quote = bytes[index];
	let mut finger = index + 1;
	while finger < bytes.len() {
		let next = memchr::memchr2(quote, b'\\', &bytes[finger..]).ok_or_else(|| unterminated(open))?;
		if bytes[finger + next] == b'\\' {
			finger += next + 2;
		} else {
			return Ok(finger + next + 1);
		}
	}
	Err(unterminated(open))
}

/// Find the closing brace that ends a format spec starting at `start`.
fn find_format_spec_end(source: &str, open: usize, start: usize) -> Result<usize, MalformedTemplate> {
	let bytes = source.as_bytes();
	match memchr::memchr2(b'{', b'}', &bytes[start..]) {
		Some(x) if bytes[start + x] == b'}' => Ok(start + x),
		Some(x) => Err(MalformedTemplate::at_char(source, start + x, Reason::NestedFieldNotAllowed)),
		None => Err(unterminated(open)),
	}
}

/// A colon that is part of `::` never splits a field.
fn is_standalone_colon(bytes: &[u8], index: usize) -> bool {
	let after_colon = index > 0 && bytes[index - 1] == b':';
	let before_colon = bytes.get(index + 1) == Some(&b':');
	!after_colon && !before_colon
}

/// A single quote directly after a digit separates digits (`1'000`), it does not start a character literal.
fn is_digit_separator(bytes: &[u8], index: usize) -> bool {
	index > 0 && bytes[index - 1].is_ascii_digit()
}

/// Shrink a range to exclude leading and trailing whitespace.
fn trim(source: &str, range: Range<usize>) -> Range<usize> {
	let text = &source[range.clone()];
	let start = range.start + (text.len() - text.trim_start().len());
	let end = range.end - (text.len() - text.trim_end().len());
	start..end.max(start)
}

fn unterminated(open: usize) -> MalformedTemplate {
	MalformedTemplate {
		position: open,
		len: 1,
		reason: Reason::UnterminatedField,
	}
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use assert2::{assert, check, let_assert};

	fn parse_fields(source: &str) -> Vec<(Range<usize>, &str, Option<&str>)> {
		let_assert!(Ok(template) = Template::parse(source));
		template.fields()
			.map(|field| (
				field.range.clone(),
				&source[field.argument.clone()],
				field.format_spec.clone().map(|x| &source[x]),
			))
			.collect()
	}

	fn parse_error(source: &str) -> (Reason, usize) {
		let_assert!(Err(e) = Template::parse(source));
		(e.reason, e.position)
	}

	#[test]
	fn test_is_standalone_colon() {
		check!(is_standalone_colon(b"a:b", 1));
		check!(is_standalone_colon(b":", 0));
		check!(!is_standalone_colon(b"a::b", 1));
		check!(!is_standalone_colon(b"a::b", 2));
		check!(!is_standalone_colon(b"::", 0));
	}

	#[test]
	fn test_skip_quoted() {
		check!(skip_quoted(b"{\"abc\"}", 0, 1) == Ok(6));
		check!(skip_quoted(b"{'}'}", 0, 1) == Ok(4));
		check!(skip_quoted(b"{\"a\\\"b\"}", 0, 1) == Ok(7));
		check!(skip_quoted(b"{\"abc}", 0, 1) == Err(unterminated(0)));
		check!(skip_quoted(b"{\"abc\\", 0, 1) == Err(unterminated(0)));
	}

	#[test]
	fn test_trim() {
		check!(trim(" ab ", 0..4) == (1..3));
		check!(trim("ab", 0..2) == (0..2));
		check!(trim("x   y", 1..4) == (4..4));
		check!(trim("x　y　", 1..8) == (4..5));
	}

	#[test]
	fn test_find_format_spec_end() {
		check!(find_format_spec_end("{x:>4}", 0, 3) == Ok(5));
		check!(find_format_spec_end("{x:}", 0, 3) == Ok(3));
		check!(let Err(MalformedTemplate { reason: Reason::NestedFieldNotAllowed, position: 3, .. }) = find_format_spec_end("{x:{w}}", 0, 3));
		check!(let Err(MalformedTemplate { reason: Reason::UnterminatedField, position: 0, .. }) = find_format_spec_end("{x:>4", 0, 3));
	}

	#[test]
	fn test_bare_fields() {
		check!(parse_fields("{a}") == [(0..3, "a", None)]);
		check!(parse_fields("x = {x:>4}!") == [(4..10, "x", Some(">4"))]);
		check!(parse_fields("{ x }") == [(0..5, "x", None)]);
		check!(parse_fields("{x:}") == [(0..4, "x", Some(""))]);
		check!(parse_fields("{now:%H:%M:%S}") == [(0..14, "now", Some("%H:%M:%S"))]);
		check!(parse_fields("{ns::value}") == [(0..11, "ns::value", None)]);
		check!(parse_fields("{ns::value:x}") == [(0..13, "ns::value", Some("x"))]);
		check!(parse_fields("{items[i:j]}") == [(0..12, "items[i:j]", None)]);
		check!(parse_fields("{f(a, b):>8}") == [(0..12, "f(a, b)", Some(">8"))]);
		check!(parse_fields("{v[{1, 2}]}") == [(0..11, "v[{1, 2}]", None)]);
	}

	#[test]
	fn test_first_standalone_colon_splits() {
		check!(parse_fields("{cond ? 1 : 2}") == [(0..14, "cond ? 1", Some(" 2"))]);
	}

	#[test]
	fn test_parenthesized_fields() {
		check!(parse_fields("{(cond ? 1 : 2)}") == [(0..16, "cond ? 1 : 2", None)]);
		check!(parse_fields("{(a ? b : c):^10}") == [(0..17, "a ? b : c", Some("^10"))]);
		check!(parse_fields("{ (a:b)}") == [(0..8, "a:b", None)]);
		check!(parse_fields("{( x )}") == [(0..7, " x ", None)]);
		check!(parse_fields("{(std::vector<int>{1, 2}.size())}") == [(0..33, "std::vector<int>{1, 2}.size()", None)]);
		check!(parse_fields("{(f(\")\"))}") == [(0..10, "f(\")\")", None)]);
	}

	#[test]
	fn test_quoted_arguments() {
		check!(parse_fields("{s == \"}\"}") == [(0..10, "s == \"}\"", None)]);
		check!(parse_fields("{c == ':'}") == [(0..10, "c == ':'", None)]);
		check!(parse_fields("{1'000:>6}") == [(0..10, "1'000", Some(">6"))]);
		check!(parse_fields("{x:'^8}") == [(0..7, "x", Some("'^8"))]);
	}

	#[test]
	fn test_escaped_braces_are_not_fields() {
		check!(parse_fields("{{literal}}").is_empty());
		check!(parse_fields("{{{x}}}") == [(2..5, "x", None)]);
	}

	#[test]
	fn test_multiple_fields_in_order() {
		let fields = parse_fields("{a}-{b:x}-{(c)}");
		assert!(fields.len() == 3);
		check!(fields[0].1 == "a");
		check!(fields[1].1 == "b");
		check!(fields[2].1 == "c");
	}

	#[test]
	fn test_unbalanced_brace() {
		check!(parse_error("a } b") == (Reason::UnbalancedBrace, 2));
		check!(parse_error("{{x}") == (Reason::UnbalancedBrace, 3));
		check!(parse_error("{x}}") == (Reason::UnbalancedBrace, 3));
	}

	#[test]
	fn test_unbalanced_paren() {
		check!(parse_error("{a)}") == (Reason::UnbalancedParen, 2));
		check!(parse_error("{f(x]}") == (Reason::UnbalancedParen, 4));
		check!(parse_error("{(a}") == (Reason::UnbalancedParen, 3));
		check!(parse_error("{(a) + b}") == (Reason::UnbalancedParen, 4));
	}

	#[test]
	fn test_empty_argument() {
		let_assert!(Err(e) = Template::parse("ab{  :x}"));
		check!(e.reason == Reason::EmptyArgument);
		check!(e.source_range() == (2..8));
		check!(parse_error("{}") == (Reason::EmptyArgument, 0));
		check!(parse_error("{()}") == (Reason::EmptyArgument, 0));
		check!(parse_error("{( ):x}") == (Reason::EmptyArgument, 0));
	}

	#[test]
	fn test_unterminated_field() {
		check!(parse_error("{unterminated") == (Reason::UnterminatedField, 0));
		check!(parse_error("ab {x:>4") == (Reason::UnterminatedField, 3));
		check!(parse_error("{(a") == (Reason::UnterminatedField, 0));
		check!(parse_error("{(a)") == (Reason::UnterminatedField, 0));
		check!(parse_error("{f(a") == (Reason::UnterminatedField, 0));
		check!(parse_error("{\"}") == (Reason::UnterminatedField, 0));
	}

	#[test]
	fn test_nested_field() {
		check!(parse_error("{a{b}}") == (Reason::NestedFieldNotAllowed, 2));
		check!(parse_error("{x:{w}}") == (Reason::NestedFieldNotAllowed, 3));
		check!(parse_error("{std::vector<int>{1, 2}.size()}") == (Reason::NestedFieldNotAllowed, 17));
	}
}
