use yoku_api::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	if let Err(error) = dotenvy::dotenv() {
		eprintln!("Failed to load `.env` file: {error}");
	}

	let _guard = yoku_api::logging::init()?;
	let config = Config::new()?;

	yoku_api::run(config).await
}
