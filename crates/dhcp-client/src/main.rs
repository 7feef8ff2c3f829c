use anyhow::Result;
use clap::Parser;
use dhcp_client::{ClientConfig, Exchange, Transport};
use dhcp_codec::WordOrder;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "/etc/dhcp-client/config.yaml";

/// DHCP Client - obtain and release a lease from a DHCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Server address (default: 255.255.255.255:67)
    #[arg(short, long)]
    server: Option<SocketAddr>,

    /// Local address to bind (default: 0.0.0.0:68)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Client hardware address as hex (e.g. E81BFDE12F00)
    #[arg(long)]
    chaddr: Option<String>,

    /// Keep the lease instead of releasing it
    #[arg(long)]
    no_release: bool,

    /// Encode secs and flags in host byte order
    #[arg(long)]
    host_order: bool,

    /// Log every packet in full
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dhcp_client=info,dhcp_codec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = if std::path::Path::new(&args.config).exists() {
        match ClientConfig::from_file(&args.config) {
            Ok(cfg) => {
                info!("Loaded configuration from {}", args.config);
                cfg
            }
            Err(e) => {
                error!("Failed to load configuration from {}: {}", args.config, e);
                info!("Using default configuration");
                ClientConfig::default()
            }
        }
    } else {
        if args.config != DEFAULT_CONFIG {
            error!("Configuration file {} not found", args.config);
        }
        info!("Using default configuration");
        ClientConfig::default()
    };

    if let Some(server) = args.server {
        config.server_address = server;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(chaddr) = args.chaddr {
        config.packet.chaddr = Some(chaddr);
    }
    if args.no_release {
        config.release = false;
    }
    if args.host_order {
        config.word_order = WordOrder::Host;
    }

    let transport = Transport::bind(
        config.bind_address,
        config.server_address,
        config.word_order,
    )
    .await
    .map_err(|e| {
        error!("Failed to bind {}: {}", config.bind_address, e);
        e
    })?;

    info!(
        "DHCP client on {} talking to {}",
        config.bind_address, config.server_address
    );

    let exchange = Exchange::new(transport, config.packet.clone())
        .with_release(config.release)
        .with_dump(args.dump);

    match exchange.run().await {
        Ok(lease) => {
            info!("Lease: {}", lease);
            Ok(())
        }
        Err(e) => {
            error!("DHCP exchange failed: {}", e);
            Err(e.into())
        }
    }
}
