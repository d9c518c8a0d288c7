//! Scan a reader a few times and print what it sees

use obidrfid::{Outcome, Reader, ReaderConfig};

#[tokio::main]
async fn main() -> obidrfid::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Change to your reader IP
    let ip = std::env::var("READER_IP").unwrap_or_else(|_| "192.168.10.10".to_string());

    let mut reader = Reader::new(ReaderConfig::default());
    reader.connect(&ip, 10001).await?;
    println!("Connected ({:?})", reader.state());

    if let Outcome::Success(info) = reader.read_info().await? {
        println!("{}", info);
    }

    for _ in 0..5 {
        match reader.scan().await? {
            Outcome::Success(inventory) if inventory.is_empty() => {
                println!("No transponders in range.")
            }
            Outcome::Success(inventory) => {
                for record in &inventory {
                    println!("{}", record);
                }
            }
            other => println!("{}", other),
        }
    }

    reader.disconnect().await?;
    println!("Disconnected");

    Ok(())
}
