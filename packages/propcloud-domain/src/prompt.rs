use serde_json::Value;

use crate::property::Property;

pub const NO_CONTEXT_REPLY: &str = "I don't have enough relevant property data to answer your question confidently. Could you ask about a specific property or provide more details about what you're looking for?";

const PERSONA: &str = "You are PropCloud, a meticulous and data-driven Miami real estate investment analyst specializing in short-term rental (STR) properties. Your tone is professional, confident, and helpful.";

const CRITICAL_RULES: [&str; 8] = [
	"You MUST ONLY use the property data provided in the [CONTEXT] section below",
	"You MUST NOT use any general real estate knowledge outside the provided data",
	"If the data required to answer the question is not in the context, state that you cannot provide a confident analysis without more information",
	"Always cite specific data points from the properties when making claims",
	"Focus on STR investment potential, ROI analysis, and market trends",
	"Provide specific numbers and calculations when possible",
	"Use **bold text** for emphasis and bullet points for lists",
	"Be concise but comprehensive in your analysis",
];

const ANALYSIS_FRAMEWORK: [&str; 5] = [
	"First, identify which properties are most relevant to the user's question",
	"Extract and analyze the relevant data points",
	"Calculate metrics like potential ROI, cash flow, cap rates when applicable using the formula: (Annual Rental Income / Property Price) × 100",
	"Compare properties if appropriate",
	"Provide clear recommendations based on the data",
];

const BLOCK_SEPARATOR: &str = "\n---\n";

/// Builds the grounded analyst prompt for `question` over `properties`.
///
/// Properties are numbered from 1 in the order given, which is the retrieval order.
pub fn master_prompt(question: &str, properties: &[Property]) -> String {
	let context = properties
		.iter()
		.enumerate()
		.map(|(idx, property)| context_block(idx + 1, property))
		.collect::<Vec<_>>()
		.join(BLOCK_SEPARATOR);
	let mut out = String::with_capacity(context.len() + 2_048);

	out.push_str(PERSONA);
	out.push_str("\n\n**CRITICAL RULES:**\n");
	push_numbered(&mut out, &CRITICAL_RULES);
	out.push_str("\n**ANALYSIS FRAMEWORK:**\n");
	push_numbered(&mut out, &ANALYSIS_FRAMEWORK);
	out.push_str("\n**[CONTEXT]:**\n");
	out.push_str(&context);
	out.push_str("\n\n**USER QUESTION:** ");
	out.push_str(question.trim());
	out.push_str("\n\n**ANALYSIS:**");

	out
}

fn push_numbered(out: &mut String, lines: &[&str]) {
	for (idx, line) in lines.iter().enumerate() {
		out.push_str(&format!("{}. {line}\n", idx + 1));
	}
}

fn context_block(ordinal: usize, property: &Property) -> String {
	let price = property.price_label().map(|label| format!("${label}"));

	format!(
		"\n**Property {ordinal}: {address}**\n\
		 - Listing Price: {price}\n\
		 - Specifications: {beds} beds, {baths} baths, {sqft} sqft\n\
		 - Description: {description}\n\
		 - Sales History: {sales}\n\
		 - Tax History: {tax}\n\
		 - Permit History: {permits}\n\
		 - Market Comparables: {comps}\n\
		 - Listing URL: {url}\n",
		address = property.address,
		price = price.as_deref().unwrap_or("N/A"),
		beds = or_na(property.beds.map(|beds| beds.to_string())),
		baths = or_na(property.baths.map(crate::format::thousands)),
		sqft = or_na(property.sqft.map(|sqft| sqft.to_string())),
		description = property.description_or_default(),
		sales = compact_json(property.sales_history.as_ref()),
		tax = compact_json(property.tax_history.as_ref()),
		permits = compact_json(property.permit_history.as_ref()),
		comps = compact_json(property.market_comps.as_ref()),
		url = property.listing_url.as_deref().filter(|url| !url.is_empty()).unwrap_or("N/A"),
	)
}

fn or_na(value: Option<String>) -> String {
	value.unwrap_or_else(|| "N/A".to_string())
}

fn compact_json(value: Option<&Value>) -> String {
	match value {
		None | Some(Value::Null) => "{}".to_string(),
		Some(value) => value.to_string(),
	}
}
