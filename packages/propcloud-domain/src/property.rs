use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format;

/// A listing as it is fed to retrieval and prompting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
	pub id: String,
	pub address: String,
	pub listing_price: Option<f64>,
	pub beds: Option<i32>,
	pub baths: Option<f64>,
	pub sqft: Option<i32>,
	pub description: Option<String>,
	pub sales_history: Option<Value>,
	pub tax_history: Option<Value>,
	pub permit_history: Option<Value>,
	pub market_comps: Option<Value>,
	pub listing_url: Option<String>,
	pub image_url: Option<String>,
}
impl Property {
	pub fn description_or_default(&self) -> &str {
		self.description
			.as_deref()
			.filter(|text| !text.trim().is_empty())
			.unwrap_or("No description available")
	}

	pub fn price_label(&self) -> Option<String> {
		self.listing_price.map(format::thousands)
	}
}

/// Text that is embedded for a property. Blank parts are dropped.
pub fn embedding_text(property: &Property) -> String {
	let price = match property.price_label() {
		Some(label) => format!("Listed at ${label}"),
		None => "Listed at N/A".to_string(),
	};
	let sqft = match property.sqft {
		Some(sqft) => format!("{sqft} square feet"),
		None => "unknown square feet".to_string(),
	};
	let parts = [
		format!("Property at {}", property.address.trim()),
		property.description_or_default().trim().to_string(),
		format!(
			"{} bedrooms, {} bathrooms",
			property.beds.unwrap_or(0),
			format::thousands(property.baths.unwrap_or(0.0))
		),
		sqft,
		price,
	];

	parts.into_iter().filter(|part| !part.trim().is_empty()).collect::<Vec<_>>().join(". ")
}
