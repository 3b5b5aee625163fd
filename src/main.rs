//! Wayfarer - terminal client for the travel-planning chat workflow
//!
//! Posts each answer to the workflow webhook and polls the chat backend
//! for the bot's replies.

mod config;
mod message;
mod reconcile;
mod remote;
mod runtime;
mod state_machine;
mod terminal;

use config::ChatConfig;
use message::SessionId;
use remote::{http_client, ChatApi, WebhookSender};
use runtime::{ChatHandle, SubmitError, ViewEvent};
use terminal::{decode_line, TranscriptPrinter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    tracing::info!(
        webhook = %config.webhook_url,
        api = %config.api_base_url,
        "Configuration loaded"
    );

    let client = http_client(config.request_timeout)?;
    let webhook = WebhookSender::new(client.clone(), config.webhook_url.clone());
    let api = ChatApi::new(client, &config.api_base_url);

    let handle = ChatHandle::start(SessionId::new(), config.poll_interval, webhook, api);
    tracing::info!(session_id = %handle.session_id(), "Conversation started");

    println!("Tunisia Travel Assistant");
    println!("I'll ask for your name, email, cities, travel dates, and contact info.");
    println!();

    let render = tokio::spawn(render_view(handle.watch()));
    let notices = tokio::spawn(render_events(handle.subscribe()));

    // Raw segments so one line that is not UTF-8 does not end the session
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    loop {
        tokio::select! {
            segment = lines.next_segment() => match segment {
                Ok(Some(raw)) => {
                    let Some(line) = decode_line(raw) else {
                        eprintln!("! Could not read that line, please type it again");
                        continue;
                    };
                    match handle.submit(line).await {
                        Ok(()) | Err(SubmitError::Rejected(state_machine::TransitionError::EmptyMessage)) => {}
                        Err(e) => eprintln!("! {e}"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
    render.abort();
    notices.abort();
    Ok(())
}

async fn render_view(mut view_rx: tokio::sync::watch::Receiver<runtime::ChatView>) {
    let mut printer = TranscriptPrinter::new();
    loop {
        let lines = printer.render(&view_rx.borrow_and_update());
        for line in lines {
            println!("{line}");
        }
        if view_rx.changed().await.is_err() {
            break;
        }
    }
}

async fn render_events(mut events: tokio::sync::broadcast::Receiver<ViewEvent>) {
    loop {
        match events.recv().await {
            Ok(ViewEvent::Notification(notification)) => {
                eprintln!("! {}: {}", notification.title, notification.description);
            }
            Ok(ViewEvent::InputReset) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Notification stream lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
