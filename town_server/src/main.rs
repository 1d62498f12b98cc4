#[tokio::main]
async fn main() -> std::io::Result<()> {
    town_server::run_with_config().await
}
