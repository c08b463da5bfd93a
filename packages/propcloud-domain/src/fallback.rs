//! Keyword ranking used when the vector match is unavailable.

use crate::property::Property;

const MIN_TERM_CHARS: usize = 3;

/// Ranks `candidates` by how many distinct query terms appear in their address or description.
///
/// Matching candidates come first, highest score first; ties and non-matching candidates keep
/// their input order. At most `limit` candidates are returned.
pub fn rank(query: &str, candidates: Vec<Property>, limit: usize) -> Vec<Property> {
	let terms = query_terms(query);
	let mut scored: Vec<(usize, usize, Property)> = candidates
		.into_iter()
		.enumerate()
		.map(|(position, property)| (score(&terms, &property), position, property))
		.collect();

	scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
	scored.truncate(limit);

	scored.into_iter().map(|(_, _, property)| property).collect()
}

pub fn query_terms(query: &str) -> Vec<String> {
	let mut terms: Vec<String> = Vec::new();

	for raw in query.split(|ch: char| !ch.is_alphanumeric()) {
		if raw.chars().count() < MIN_TERM_CHARS {
			continue;
		}

		let term = raw.to_lowercase();

		if !terms.contains(&term) {
			terms.push(term);
		}
	}

	terms
}

fn score(terms: &[String], property: &Property) -> usize {
	if terms.is_empty() {
		return 0;
	}

	let haystack = format!(
		"{} {}",
		property.address.to_lowercase(),
		property.description.as_deref().unwrap_or_default().to_lowercase()
	);

	terms.iter().filter(|term| haystack.contains(term.as_str())).count()
}
