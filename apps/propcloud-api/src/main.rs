use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = propcloud_api::Args::parse();

	propcloud_api::run(args).await
}
