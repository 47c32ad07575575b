use super::{Field, Part, Template};

/// Common `render` prototype for the residual template, e.g., for fields and templates.
pub trait Render {
	/// Render the residual form into the output string.
	fn render(&self, output: &mut String, source: &str);
}

impl Render for Template {
	/// Render the residual template: literal text and escaped braces unchanged, fields reduced to placeholders.
	fn render(&self, output: &mut String, source: &str) {
		for part in &self.parts {
			match part {
				Part::Literal(x) => output.push_str(&source[x.range.clone()]),
				Part::EscapedBrace(x) => {
					output.push(x.brace);
					output.push(x.brace);
				},
				Part::Field(x) => x.render(output, source),
			}
		}
	}
}

impl Render for Field {
	/// Render the field as an empty placeholder that keeps its format spec.
	fn render(&self, output: &mut String, source: &str) {
		output.push('{');
		if let Some(format_spec) = &self.format_spec {
			if !format_spec.is_empty() {
				output.push(':');
				output.push_str(&source[format_spec.clone()]);
			}
		}
		output.push('}');
	}
}
