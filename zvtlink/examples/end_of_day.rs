//! End-of-day batch example

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zvtlink::{ClientConfig, RegistrationConfig, TcpTransport, ZvtClient};

#[tokio::main]
async fn main() -> zvtlink::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let ip = std::env::var("TERMINAL_IP").unwrap_or_else(|_| "192.168.1.50".to_string());

    let transport = TcpTransport::new(ip, zvtlink::DEFAULT_PORT);
    let config = ClientConfig::new(123456)
        // Batches can take a while on a busy day
        .with_command_completion_timeout(Duration::from_secs(600));
    let mut client = ZvtClient::connect(Box::new(transport), config).await?;

    client
        .events()
        .line
        .subscribe(|line| println!("| {}", line.text));

    let cancel = CancellationToken::new();

    let response = client
        .registration(&RegistrationConfig::default(), &cancel)
        .await;
    println!("Registration: {response}");

    let response = client.end_of_day(&cancel).await;
    println!("End-of-day: {response}");

    client.close().await;
    Ok(())
}
