use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = propcloud_worker::Args::parse();

	propcloud_worker::run(args).await
}
