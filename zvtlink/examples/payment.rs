//! Card payment example

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use zvtlink::{ClientConfig, RegistrationConfig, TcpTransport, ZvtClient};

#[tokio::main]
async fn main() -> zvtlink::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let ip = std::env::var("TERMINAL_IP").unwrap_or_else(|_| "192.168.1.50".to_string());
    let language = std::env::var("TERMINAL_LANGUAGE")
        .unwrap_or_else(|_| "en".to_string())
        .parse()?;

    let transport = TcpTransport::new(ip, zvtlink::DEFAULT_PORT);
    let config = ClientConfig::new(123456).with_language(language);
    let mut client = ZvtClient::connect(Box::new(transport), config).await?;

    // Display prompts and receipt lines as they arrive
    client
        .events()
        .intermediate_status
        .subscribe(|text: &String| println!("PT: {text}"));
    client
        .events()
        .line
        .subscribe(|line| println!("| {}", line.text));
    client
        .events()
        .status_information
        .subscribe(|status| println!("Status: {status}"));

    let cancel = CancellationToken::new();

    let response = client
        .registration(&RegistrationConfig::default(), &cancel)
        .await;
    println!("Registration: {response}");

    let response = client.payment(Decimal::new(123, 2), &cancel).await;
    println!("Payment 1.23 EUR: {response}");

    let response = client.log_off(&cancel).await;
    println!("Log-off: {response}");

    client.close().await;
    Ok(())
}
