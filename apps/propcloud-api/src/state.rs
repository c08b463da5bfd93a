use std::sync::Arc;

use propcloud_service::PropcloudService;
use propcloud_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PropcloudService>,
}
impl AppState {
	pub async fn new(config: propcloud_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector_dim).await?;

		Ok(Self::from_service(PropcloudService::new(config, db)))
	}

	pub fn from_service(service: PropcloudService) -> Self {
		Self { service: Arc::new(service) }
	}
}
