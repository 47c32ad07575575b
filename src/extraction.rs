//! The result of splitting a template into a format string and arguments.

/// A template split into a residual format string and the argument expressions.
///
/// The residual template keeps all literal text and doubled braces.
/// Each field is reduced to an empty placeholder that keeps its format spec,
/// so the `n`-th placeholder binds to `arguments[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extraction {
	/// The residual template, with the argument text removed from every field.
	pub template: String,

	/// The argument text of every field, in order of appearance.
	pub arguments: Vec<String>,
}

impl Extraction {
	/// Render the call expression for a formatting function.
	///
	/// The residual template is written as a quoted string literal, followed by the arguments:
	/// `callee("residual", arguments[0], arguments[1], ...)`.
	/// Arguments that contain a comma are wrapped in parentheses, so they remain a single argument.
	///
	/// ```
	/// # fn main() -> Result<(), xstring::MalformedTemplate> {
	/// let extraction = xstring::extract("{a} + {b} = {(a + b):>4}")?;
	/// assert_eq!(extraction.call_expression("std::format"), r#"std::format("{} + {} = {:>4}", a, b, a + b)"#);
	/// # Ok(())
	/// # }
	/// ```
	pub fn call_expression(&self, callee: &str) -> String {
		let mut output = String::with_capacity(callee.len() + self.template.len() + 16 * self.arguments.len());
		output.push_str(callee);
		output.push('(');
		push_string_literal(&mut output, &self.template);
		for argument in &self.arguments {
			let argument = argument.trim();
			output.push_str(", ");
			if argument.contains(',') {
				output.push('(');
				output.push_str(argument);
				output.push(')');
			} else {
				output.push_str(argument);
			}
		}
		output.push(')');
		output
	}

	/// Put the arguments back into their placeholders.
	///
	/// Extracting the result again gives an equal [`Extraction`].
	/// To guarantee that, arguments are wrapped in parentheses when they would not survive a bare field unchanged:
	/// if they contain a colon or a brace, start with a parenthesis, or have surrounding whitespace.
	/// The same applies when the format spec itself starts with a colon.
	///
	/// Returns `None` if the number of placeholders does not match the number of arguments,
	/// or if the residual template is not well-formed.
	pub fn reassemble(&self) -> Option<String> {
		let template = self.template.as_str();
		let bytes = template.as_bytes();
		let mut output = String::with_capacity(template.len() + self.arguments.iter().map(|x| x.len() + 2).sum::<usize>());
		let mut arguments = self.arguments.iter();
		let mut finger = 0;
		while finger < bytes.len() {
			let next = match memchr::memchr2(b'{', b'}', &bytes[finger..]) {
				Some(x) => finger + x,
				None => bytes.len(),
			};
			output.push_str(&template[finger..next]);
			if next == bytes.len() {
				break;
			}

			let brace = bytes[next];
			if bytes.get(next + 1) == Some(&brace) {
				output.push_str(&template[next..next + 2]);
				finger = next + 2;
			} else if brace == b'}' {
				return None;
			} else {
				let close = next + 1 + memchr::memchr2(b'{', b'}', &bytes[next + 1..])?;
				let format_spec = &template[next + 1..close];
				if bytes[close] != b'}' || !(format_spec.is_empty() || format_spec.starts_with(':')) {
					return None;
				}
				let argument = arguments.next()?;
				output.push('{');
				// A format spec that starts with a colon would merge with the delimiter into `::`.
				if needs_parentheses(argument) || format_spec.starts_with("::") {
					output.push('(');
					output.push_str(argument);
					output.push(')');
				} else {
					output.push_str(argument);
				}
				output.push_str(format_spec);
				output.push('}');
				finger = close + 1;
			}
		}

		if arguments.next().is_some() {
			return None;
		}
		Some(output)
	}
}

/// Check if an argument must be parenthesized to be read back as the same argument.
fn needs_parentheses(argument: &str) -> bool {
	argument.trim() != argument || argument.starts_with('(') || argument.contains([':', '{', '}'])
}

/// Write a string as a double quoted string literal with C-style escapes.
fn push_string_literal(output: &mut String, value: &str) {
	output.push('"');
	for c in value.chars() {
		match c {
			'\\' => output.push_str("\\\\"),
			'"' => output.push_str("\\\""),
			'\n' => output.push_str("\\n"),
			'\r' => output.push_str("\\r"),
			'\t' => output.push_str("\\t"),
			// Octal escapes have a fixed length, so they can not swallow a following digit.
			c if c.is_ascii_control() => output.push_str(&format!("\\{:03o}", u32::from(c))),
			c => output.push(c),
		}
	}
	output.push('"');
}
