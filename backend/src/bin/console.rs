//! Parkwise interactive console.
//!
//! Menu-driven front end: choose `1` to enter a destination address and get the best
//! parking near it, `2` to exit. Ctrl-C cancels a running search; at the menu it exits.
//!
//! Configuration is read the same way as the HTTP server (see `parkwise-server`).

use std::env;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use parkwise::config::AppConfig;
use parkwise::services::{ParkingService, ServiceFactory};

const MENU: &str = "\nchoose what to start\n1 - Start program\n2 - exit";
const SEPARATOR: &str =
    "--------------------------------------------------------------------------";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = AppConfig::load()?;
    let service = ServiceFactory::from_config(&config)
        .await
        .context("Failed to start the parking service")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{}", MENU);
        let Some(choice) = read_line(&mut lines).await? else {
            break;
        };

        match choice.trim() {
            "1" => {
                println!("Please enter destination address");
                let Some(address) = read_line(&mut lines).await? else {
                    break;
                };
                run_search(&service, &address).await;
            }
            "2" => {
                println!("Thanks for using Parkwise.");
                break;
            }
            other => println!("Unknown option '{}'", other),
        }
    }

    Ok(())
}

/// Next input line; `None` on end of input or Ctrl-C.
async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    tokio::select! {
        line = lines.next_line() => Ok(line?),
        _ = tokio::signal::ctrl_c() => Ok(None),
    }
}

async fn run_search(service: &ParkingService, address: &str) {
    let cancel = CancellationToken::new();
    let search = service.submit_with_cancel(address, &cancel);
    tokio::pin!(search);

    let reply = tokio::select! {
        reply = &mut search => reply,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            search.await
        }
    };

    println!("\n{}", SEPARATOR);
    println!("{}", reply.text);
    println!("{}", SEPARATOR);
}
