use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use propcloud_domain::property::Property;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaitlistEntry {
	pub id: Uuid,
	pub email: String,
	pub referral_source: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
	pub id: Uuid,
	pub conversation_id: Uuid,
	pub role: String,
	pub content: String,
	pub created_at: OffsetDateTime,
}

/// A `properties` row without its embedding column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyRow {
	pub id: Uuid,
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
	pub created_at: OffsetDateTime,
}
impl From<PropertyRow> for Property {
	fn from(row: PropertyRow) -> Self {
		Self {
			id: row.id.to_string(),
			address: row.address,
			listing_price: row.listing_price,
			beds: row.beds,
			baths: row.baths,
			sqft: row.sqft,
			description: row.description,
			sales_history: row.sales_history,
			tax_history: row.tax_history,
			permit_history: row.permit_history,
			market_comps: row.market_comps,
			listing_url: row.listing_url,
			image_url: row.image_url,
		}
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchedProperty {
	#[sqlx(flatten)]
	pub property: PropertyRow,
	pub similarity: f64,
}

/// Fields accepted when seeding a listing.
#[derive(Debug, Clone, Default)]
pub struct NewProperty {
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
