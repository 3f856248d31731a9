use std::{env, env::VarError};

use checkout_engine::db_types::Role;
use chrono::Duration;
use storefront_common::Secret;

use crate::auth::{SessionClaims, TokenIssuer, DEFAULT_SESSION_TTL_HOURS};

/// There's no real CLI for the server, so just do quick 'n dirty.
///
/// `checkout_server token <user_id> [admin]` prints a session token for the given user, signed with
/// `CHECKOUT_SESSION_SECRET`. Anything else prints the help text and the current (non-secret) configuration.
///
/// Returns true if the process should exit instead of starting the server.
pub fn handle_command_line_args() -> bool {
    let args = env::args().skip(1).collect::<Vec<String>>();
    if args.is_empty() {
        return false;
    }
    match args.first().map(String::as_str) {
        Some("token") => print_token(&args[1..]),
        _ => {
            display_readme();
            display_envs();
        },
    }
    true
}

fn print_token(args: &[String]) {
    let Some(user_id) = args.first().and_then(|s| s.parse::<i64>().ok()) else {
        eprintln!("Usage: checkout_server token <user_id> [admin]");
        return;
    };
    let secret = match env::var("CHECKOUT_SESSION_SECRET") {
        Ok(s) if !s.is_empty() => Secret::new(s),
        _ => {
            eprintln!("CHECKOUT_SESSION_SECRET must be set to issue tokens the server will accept.");
            return;
        },
    };
    let mut roles = vec![Role::User];
    if args.get(1).is_some_and(|s| s == "admin") {
        roles.push(Role::Admin);
    }
    let claims = SessionClaims::new(user_id, roles, Duration::hours(DEFAULT_SESSION_TTL_HOURS));
    match TokenIssuer::new(&secret).issue_token(&claims) {
        Ok(token) => println!("{token}"),
        Err(e) => eprintln!("Could not issue token. {e}"),
    }
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 19] = [
        "RUST_LOG",
        "CHECKOUT_HOST",
        "CHECKOUT_PORT",
        "CHECKOUT_DATABASE_URL",
        "CHECKOUT_PUBLIC_URL",
        "CHECKOUT_STOREFRONT_URL",
        "CHECKOUT_UNPAID_ORDER_TIMEOUT",
        "CHECKOUT_EXPIRY_INTERVAL_SECS",
        "CHECKOUT_ITEM_SOURCE",
        "CHECKOUT_RUN_MIGRATIONS",
        "CHECKOUT_TAX_RATE_BPS",
        "CHECKOUT_SHIPPING_FEE",
        "CHECKOUT_FREE_SHIPPING_THRESHOLD",
        "CHECKOUT_GATEWAY_BASE_URL",
        "CHECKOUT_GATEWAY_MERCHANT_ID",
        "CHECKOUT_GATEWAY_SALT_INDEX",
        "CHECKOUT_GATEWAY_TIMEOUT_SECS",
        "CHECKOUT_SMTP_HOST",
        "CHECKOUT_EMAIL_FROM",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
