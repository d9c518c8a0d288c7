//! OBID reader CLI
//!
//! Reconfigures a reader's IP address or streams tag reads to the console.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use obidrfid::{
    poll_inventory, CancelToken, Outcome, OutcomeExt, PollOptions, Reader, ReaderConfig,
};

/// OBID RFID reader tool
#[derive(Parser, Debug)]
#[command(name = "obidrfid")]
#[command(about = "Configure OBID RFID LAN readers and read transponders")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Change the IP address of a reader
    Config {
        /// Current IP address of the reader
        #[arg(long)]
        ip: Ipv4Addr,

        /// IP address to configure
        #[arg(long)]
        set_ip: Ipv4Addr,

        /// Reader LAN port
        #[arg(short, long, default_value_t = 10001)]
        port: u16,
    },

    /// Read transponders until Ctrl-C
    Read {
        /// IP address of the reader
        #[arg(long)]
        ip: Ipv4Addr,

        /// Reader LAN port
        #[arg(short, long, default_value_t = 10001)]
        port: u16,

        /// Pause between scans in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        /// Stop after this many scans
        #[arg(short, long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    match args.command {
        Commands::Config { ip, set_ip, port } => configure(ip, set_ip, port).await,
        Commands::Read {
            ip,
            port,
            interval_ms,
            count,
        } => {
            let mut options =
                PollOptions::default().with_interval(Duration::from_millis(interval_ms));
            if let Some(count) = count {
                options = options.with_max_iterations(count);
            }
            read(ip, port, options).await
        }
    }
}

async fn connect(ip: Ipv4Addr, port: u16) -> anyhow::Result<Reader> {
    let config = ReaderConfig::builder().port(port).build();
    let mut reader = Reader::new(config);

    println!("Connecting to IP address {}", ip);
    reader
        .connect(&ip.to_string(), port)
        .await
        .with_context(|| format!("Cannot connect to reader at {}:{}", ip, port))?;

    println!("Reader ready ({:?}).", reader.state());
    Ok(reader)
}

async fn print_reader_info(reader: &mut Reader) -> anyhow::Result<()> {
    println!("Reading reader info...");
    match reader.read_info().await? {
        Outcome::Success(info) => println!("{}", info),
        other => println!("Reader info unavailable: {}", other),
    }
    Ok(())
}

async fn configure(ip: Ipv4Addr, set_ip: Ipv4Addr, port: u16) -> anyhow::Result<()> {
    println!("Configuration");

    let mut reader = connect(ip, port).await?;

    let block = reader
        .read_lan_config()
        .await?
        .into_result()
        .context("Cannot read LAN configuration")?;

    print_reader_info(&mut reader).await?;

    println!("Changing IP address to {}", set_ip);
    let octets: Vec<u32> = set_ip.octets().iter().map(|&o| u32::from(o)).collect();
    let written = reader
        .write_lan_config(&block, &octets)
        .await?
        .into_result()
        .context("Cannot write LAN configuration")?;

    if written.ip() != set_ip {
        bail!("Reader kept IP address {} instead of {}", written.ip(), set_ip);
    }

    reader
        .system_reset()
        .await?
        .into_result()
        .context("Cannot reset reader")?;

    reader.disconnect().await?;

    println!("All set, the IP address of the reader is now {}", set_ip);
    Ok(())
}

async fn read(ip: Ipv4Addr, port: u16, options: PollOptions) -> anyhow::Result<()> {
    let mut reader = connect(ip, port).await?;
    print_reader_info(&mut reader).await?;

    let cancel = CancelToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    println!("Press Ctrl-C to exit.");
    println!("======== READING TAGS ============");

    let result = poll_inventory(&mut reader, &options, &cancel, |outcome| match outcome {
        Outcome::Success(inventory) if !inventory.is_empty() => {
            println!("----------------------");
            println!(
                "[{}] Found {} transponders:",
                Local::now().format("%H:%M:%S%.3f"),
                inventory.len()
            );
            for record in inventory {
                println!("{}", record);
            }
        }
        Outcome::Success(_) | Outcome::Status { .. } => println!("No transponders in range."),
        Outcome::Error { .. } => println!("Scan failed: {}", outcome),
    })
    .await;

    reader.disconnect().await?;

    let summary = result?;
    if cancel.is_cancelled() {
        println!("goodbye");
    }
    tracing::debug!("{:?}", summary);

    Ok(())
}
