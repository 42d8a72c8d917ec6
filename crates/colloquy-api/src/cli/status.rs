//! System status dashboard command.

use anyhow::Result;
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use console::style;

use colloquy_core::store::feedback::FeedbackStore;
use colloquy_core::store::thread::ThreadStore;
use colloquy_core::store::user::UserStore;
use colloquy_infra::llm::openai::client::API_KEY_ENV;
use colloquy_infra::sqlite::feedback::SqliteFeedbackStore;
use colloquy_infra::sqlite::thread::SqliteThreadStore;
use colloquy_infra::sqlite::user::SqliteUserStore;

use crate::state::AppState;

/// Display the system status dashboard.
///
/// Shows entity counts, trailing-24h activity, the database location, and
/// whether the answer provider is configured.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let users = SqliteUserStore::new(state.db_pool.clone()).count_all().await?;
    let threads = SqliteThreadStore::new(state.db_pool.clone()).count_all().await?;
    let feedback = SqliteFeedbackStore::new(state.db_pool.clone())
        .count_all(None)
        .await?;
    let activity = state.report_service.activity_stats(Utc::now()).await?;

    let provider_configured = std::env::var(API_KEY_ENV)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "users": users,
            "threads": threads,
            "feedback": feedback,
            "last_24h": {
                "signups": activity.signups,
                "logins": activity.logins,
                "chats": activity.chats,
            },
            "provider": {
                "model": state.config.provider.model,
                "configured": provider_configured,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Colloquy v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["", "Total", "Last 24h"]);
    table.add_row(vec!["Users".to_string(), users.to_string(), activity.signups.to_string()]);
    table.add_row(vec!["Logins".to_string(), "-".to_string(), activity.logins.to_string()]);
    table.add_row(vec!["Threads".to_string(), threads.to_string(), "-".to_string()]);
    table.add_row(vec!["Chats".to_string(), "-".to_string(), activity.chats.to_string()]);
    table.add_row(vec!["Feedback".to_string(), feedback.to_string(), "-".to_string()]);
    for line in table.lines() {
        println!("  {line}");
    }
    println!();

    println!("  {}", style("── Provider ──").dim());
    println!("  Model:      {}", state.config.provider.model);
    println!(
        "  API key:    {}",
        if provider_configured {
            format!("{}", style("configured").green())
        } else {
            format!("{}", style(format!("missing ({API_KEY_ENV})")).yellow())
        }
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
