use anyhow::{Context, Result};
use clap::Parser;
use hello_mqtt::{HelloConfig, HelloMqttClient};
use std::path::PathBuf;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "hello-mqtt")]
#[command(about = "Connect to an MQTT broker and publish hello greetings")]
#[command(version)]
struct Args {
    #[arg(help = "Names to greet (defaults to the configured names)")]
    names: Vec<String>,

    #[arg(short, long, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "MQTT broker host (overrides config)")]
    host: Option<String>,

    #[arg(long, help = "MQTT broker port (overrides config)")]
    port: Option<u16>,

    #[arg(long, help = "Pause between greetings in milliseconds")]
    interval_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(long, help = "Generate default configuration file")]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = if args.verbose {
        "debug,rumqttc=info"
    } else {
        "info,rumqttc=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_target(false)
        .init();

    let config_path = args.config.unwrap_or_else(HelloConfig::get_config_path);

    if args.generate_config {
        HelloConfig::default()
            .save_to_file(&config_path)
            .context("Failed to generate default configuration")?;
        info!("Default configuration saved to: {:?}", config_path);
        return Ok(());
    }

    let mut config =
        HelloConfig::load_or_default(&config_path).context("Failed to load configuration")?;
    config.apply_env_overrides()?;

    if let Some(host) = args.host {
        config.mqtt.host = host;
    }
    if let Some(port) = args.port {
        config.mqtt.port = port;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.greeting.interval_ms = interval_ms;
    }
    if !args.names.is_empty() {
        config.greeting.names = args.names;
    }
    config.validate()?;

    let names = config.greeting.names.clone();
    let interval = Duration::from_millis(config.greeting.interval_ms);
    let mut client = HelloMqttClient::new(config.mqtt);

    println!(
        "Connecting to MQTT broker at {}:{}",
        client.broker_host(),
        client.broker_port()
    );

    let connected = client.connect().await;
    if connected {
        for (i, name) in names.iter().enumerate() {
            if client.publish_hello(name).await {
                println!("✓ Published hello message for {}", name);
            } else {
                println!("✗ Failed to publish message for {}", name);
            }

            if i + 1 < names.len() {
                sleep(interval).await;
            }
        }
    } else {
        error!("Failed to connect to MQTT broker");
        println!(
            "Make sure an MQTT broker is running on {}:{}",
            client.broker_host(),
            client.broker_port()
        );
        println!("You can start one with: docker run -it -p 1883:1883 eclipse-mosquitto");
    }

    client.disconnect().await;
    info!("Disconnected from broker");

    if !connected {
        std::process::exit(1);
    }

    Ok(())
}
