//! Admin account creation command.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use crate::state::AppState;

/// Create an admin account. The password is prompted with confirmation
/// so it never lands in shell history.
pub async fn create_admin(state: &AppState, email: &str, name: &str, json: bool) -> Result<()> {
    let password = Password::new()
        .with_prompt("Admin password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let user = state.user_service.create_admin(email, name, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Admin account created: {} <{}>",
        style("✓").green().bold(),
        style(&user.name).cyan(),
        user.email
    );
    println!("  id: {}", style(&user.id).dim());
    println!();

    Ok(())
}
