/// Formats a number with en-US digit grouping and at most three fractional digits.
pub fn thousands(value: f64) -> String {
	if !value.is_finite() {
		return value.to_string();
	}

	let fixed = format!("{:.3}", value.abs());
	let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
	let frac_part = frac_part.trim_end_matches('0');
	let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
	let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);

	if negative {
		out.push('-');
	}

	for (idx, digit) in int_part.chars().enumerate() {
		if idx > 0 && (int_part.len() - idx) % 3 == 0 {
			out.push(',');
		}
		out.push(digit);
	}

	if !frac_part.is_empty() {
		out.push('.');
		out.push_str(frac_part);
	}

	out
}
