//! Interactive launcher for the server.

use dialoguer::{Confirm, Input};
use hardhat_database::db::DEFAULT_DATABASE_URL;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Prompts for the database URL, bind address, and port, exports them as
/// `DATABASE_URL`, `BIND_ADDR`, and `PORT`, then starts
/// [`super::run_server`].
///
/// Current environment values are offered as defaults.
///
/// # Errors
///
/// Returns an `std::io::Result` error if a prompt fails or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Hardhat Housing Server");
    println!();

    let database_url: String = Input::new()
        .with_prompt("Database URL")
        .default(env_or("DATABASE_URL", DEFAULT_DATABASE_URL))
        .interact_text()
        .map_err(std::io::Error::other)?;

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(env_or("BIND_ADDR", "127.0.0.1"))
        .interact_text()
        .map_err(std::io::Error::other)?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(env_or("PORT", "8080").parse().unwrap_or(8080))
        .interact_text()
        .map_err(std::io::Error::other)?;

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .map_err(std::io::Error::other)?
    {
        println!("Cancelled.");
        return Ok(());
    }

    // SAFETY: nothing else reads or writes the environment until the server
    // has started, and these are only read during its initialisation.
    unsafe {
        std::env::set_var("DATABASE_URL", &database_url);
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", port.to_string());
    }

    super::run_server().await
}
