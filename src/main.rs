//! nutritrack CLI - log in to a nutrition-tracker backend, manage the
//! food catalog, and record daily nutrition entries.
//!
//! All authenticated commands go through the session-managed API client;
//! an expired access token is refreshed and retried transparently, and
//! only an unrecoverable session sends the user back to `login`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nutritrack::auth::CredentialStore;
use nutritrack::models::{FoodCreate, TrackerEntryCreate};
use nutritrack::{ApiClient, ApiError, Config};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() -> ! {
    eprintln!(
        "Usage: nutritrack <command> [args]\n\
         \n\
         Commands:\n\
           login [username] [--remember]   Authenticate and store the session\n\
           register <username>             Create a new account\n\
           logout [--forget]               Drop the session (--forget clears the keychain too)\n\
           me                              Show the current user's profile\n\
           foods                           List the food catalog\n\
           add-food <name> <kcal> <protein> <fats> <carbs>\n\
           tracker                         List daily nutrition entries\n\
           log <kcal> <protein> <fats> <carbs> [YYYY-MM-DD]\n\
           track <food-id>                 Add a cataloged food to today's entry"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };

    let mut config = Config::load().context("Failed to load configuration")?;
    let client = ApiClient::new(config.api_base_url(), config.data_dir()?)
        .context("Failed to build API client")?;

    match command.as_str() {
        "login" => cmd_login(&client, &mut config, &args[1..]).await,
        "register" => cmd_register(&client, &mut config, &args[1..]).await,
        "logout" => cmd_logout(&client, &config, &args[1..]).await,
        "me" => cmd_me(&client).await,
        "foods" => cmd_foods(&client).await,
        "add-food" => cmd_add_food(&client, &args[1..]).await,
        "tracker" => cmd_tracker(&client).await,
        "log" => cmd_log(&client, &args[1..]).await,
        "track" => cmd_track(&client, &args[1..]).await,
        _ => usage(),
    }
}

/// Print the error; point the user back to login when the session is gone
fn report(err: ApiError) -> Result<()> {
    match err {
        ApiError::SessionExpired => {
            eprintln!("Session expired. Please run `nutritrack login`.");
        }
        other => eprintln!("Error: {}", other),
    }
    std::process::exit(1);
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Empty credentials never reach the network
fn require_nonempty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{what} must not be empty");
    }
    Ok(trimmed.to_string())
}

async fn cmd_login(client: &ApiClient, config: &mut Config, args: &[String]) -> Result<()> {
    let remember = args.iter().any(|a| a == "--remember");
    let username = match args.iter().find(|a| !a.starts_with("--")) {
        Some(name) => name.clone(),
        None => match &config.last_username {
            Some(name) => name.clone(),
            None => prompt_line("Username: ")?,
        },
    };
    let username = require_nonempty(&username, "Username")?;

    // Prefer a remembered password, fall back to a prompt
    let credentials = CredentialStore::for_user(&username);
    let password = match credentials.load() {
        Some(stored) => {
            info!(%username, "Using password from keychain");
            stored
        }
        None => rpassword::prompt_password("Password: ")?,
    };
    let password = require_nonempty(&password, "Password")?;

    match client.login(&username, &password).await {
        Ok(()) => {
            println!("Logged in as {username}");
            config.last_username = Some(username.clone());
            if let Err(e) = config.save() {
                eprintln!("Warning: failed to save config: {e:#}");
            }
            if remember {
                match credentials.store(&password) {
                    Ok(()) => println!("Password stored in the OS keychain."),
                    Err(e) => eprintln!("Warning: failed to store password: {e:#}"),
                }
            }
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn cmd_register(client: &ApiClient, config: &mut Config, args: &[String]) -> Result<()> {
    let Some(username) = args.first() else {
        anyhow::bail!("Usage: nutritrack register <username>");
    };
    let username = require_nonempty(username, "Username")?;
    let password = rpassword::prompt_password("Password: ")?;
    let password = require_nonempty(&password, "Password")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    match client.register(&username, &password).await {
        Ok(session_established) => {
            config.last_username = Some(username.clone());
            if let Err(e) = config.save() {
                eprintln!("Warning: failed to save config: {e:#}");
            }
            if session_established {
                println!("Account created and logged in as {username}");
            } else {
                println!("Account created. Run `nutritrack login {username}` to sign in.");
            }
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn cmd_logout(client: &ApiClient, config: &Config, args: &[String]) -> Result<()> {
    client.logout().await;
    if args.iter().any(|a| a == "--forget") {
        if let Some(username) = &config.last_username {
            CredentialStore::for_user(username)
                .forget()
                .context("Failed to delete keychain credentials")?;
        }
    }
    println!("Logged out.");
    Ok(())
}

async fn cmd_me(client: &ApiClient) -> Result<()> {
    match client.me().await {
        Ok(profile) => {
            println!("Profile for {}", profile.display_name());
            println!("Username: {}", profile.username);
            println!("Name:     {}", profile.name.as_deref().unwrap_or("N/A"));
            println!("Weight:   {}", format_opt(profile.weight));
            println!("Height:   {}", format_opt(profile.height));
            println!(
                "Age:      {}",
                profile
                    .age
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            );
            println!("Active:   {}", if profile.is_active { "Yes" } else { "No" });
            println!("Scopes:   {}", profile.scopes.as_deref().unwrap_or("N/A"));
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn format_opt(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

async fn cmd_foods(client: &ApiClient) -> Result<()> {
    match client.list_foods().await {
        Ok(foods) if foods.is_empty() => {
            println!("No foods yet. Add one with `nutritrack add-food`.");
            Ok(())
        }
        Ok(foods) => {
            for food in foods {
                println!("[{}] {}", food.id, food.summary());
            }
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn cmd_add_food(client: &ApiClient, args: &[String]) -> Result<()> {
    let [name, calories, proteins, fats, carbs] = args else {
        anyhow::bail!("Usage: nutritrack add-food <name> <kcal> <protein> <fats> <carbs>");
    };
    let food = FoodCreate {
        name: require_nonempty(name, "Food name")?,
        calories: parse_macro(calories, "calories")?,
        proteins: parse_macro(proteins, "proteins")?,
        fats: parse_macro(fats, "fats")?,
        carbs: parse_macro(carbs, "carbs")?,
    };

    match client.add_food(&food).await {
        Ok(created) => {
            println!("Added [{}] {}", created.id, created.summary());
            Ok(())
        }
        Err(e) => report(e),
    }
}

fn parse_macro(value: &str, what: &str) -> Result<f64> {
    let parsed: f64 = value
        .parse()
        .with_context(|| format!("Invalid number for {what}: {value}"))?;
    if parsed < 0.0 {
        anyhow::bail!("{what} must not be negative");
    }
    Ok(parsed)
}

async fn cmd_tracker(client: &ApiClient) -> Result<()> {
    match client.tracker_entries().await {
        Ok(entries) if entries.is_empty() => {
            println!("No tracker entries yet.");
            Ok(())
        }
        Ok(entries) => {
            for entry in entries {
                println!("{}", entry.summary());
            }
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn cmd_log(client: &ApiClient, args: &[String]) -> Result<()> {
    if args.len() < 4 || args.len() > 5 {
        anyhow::bail!("Usage: nutritrack log <kcal> <protein> <fats> <carbs> [YYYY-MM-DD]");
    }
    let date = match args.get(4) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {raw}"))?,
        None => Local::now().date_naive(),
    };
    let entry = TrackerEntryCreate {
        date,
        calories: parse_macro(&args[0], "calories")?,
        proteins: parse_macro(&args[1], "proteins")?,
        fats: parse_macro(&args[2], "fats")?,
        carbs: parse_macro(&args[3], "carbs")?,
    };

    match client.add_tracker_entry(&entry).await {
        Ok(created) => {
            println!("Logged {}", created.summary());
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn cmd_track(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(raw_id) = args.first() else {
        anyhow::bail!("Usage: nutritrack track <food-id>");
    };
    let food_id: i64 = raw_id
        .parse()
        .with_context(|| format!("Invalid food id: {raw_id}"))?;

    match client.add_food_to_tracker(food_id).await {
        Ok(entry) => {
            println!("Updated {}", entry.summary());
            Ok(())
        }
        Err(e) => report(e),
    }
}
