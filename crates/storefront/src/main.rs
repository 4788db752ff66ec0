use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookstore_storefront::config::{LogFormat, StorefrontConfig};
use bookstore_storefront::notice::Notice;
use bookstore_storefront::{render, shell, Storefront};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = StorefrontConfig::from_env();

    // --- Tracing (stderr, so it never mixes with page output) ---
    init_tracing(config.log_format);
    tracing::info!(
        api_url = %config.client.api_url,
        data_dir = %config.data_dir.display(),
        "Loaded storefront configuration"
    );

    // --- Storefront ---
    let app = Storefront::from_config(&config).expect("Failed to initialize storefront");
    let mut notices = app.notices().subscribe();
    app.start().await;

    let first = app.navigate("/").await;
    flush_notices(&mut notices);
    if let Some(page) = first {
        print!("{}", render::page(&page));
    }
    println!("Type 'help' for commands.");

    // --- Command loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&app).await;

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        let outcome = shell::run_line(&app, &line).await;

        flush_notices(&mut notices);
        if let Some(output) = outcome.output {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
        if outcome.quit {
            break;
        }
    }

    app.shutdown();
    tracing::info!("Storefront closed");
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookstore_storefront=info,bookstore_client=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Print every notice published since the last call.
fn flush_notices(rx: &mut tokio::sync::broadcast::Receiver<Notice>) {
    loop {
        match rx.try_recv() {
            Ok(notice) => println!("{}", render::notice(&notice)),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Dropped notices");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn print_prompt(app: &Storefront) {
    let status = render::status_line(
        &app.current_route().await,
        &app.session_state(),
        &app.cart_snapshot().await,
        app.theme().current().await,
    );
    println!("{status}");
    print!("> ");
    let _ = std::io::stdout().flush();
}
