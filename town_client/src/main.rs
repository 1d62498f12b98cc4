#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    town_client::run_with_config().await
}
