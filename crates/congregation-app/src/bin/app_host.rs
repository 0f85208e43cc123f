//! Minimal host for exercising the core outside a frontend.
//! This binary is guarded by the `host` feature and boots `AuthContext`
//! against the in-memory gateway seeded for one scenario, then prints what a
//! frontend would render. It is **not** a server.
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use congregation_app::gateway::MemoryGateway;
use congregation_app::ui::UiAuthContext;
use congregation_app::{AppConfig, AuthContext, Profile, Route, Screen};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// No stored session
    SignedOut,
    /// Stored session for a regular member without a profile row yet
    Member,
    /// Stored session for an elevated member
    Admin,
    /// Backend unreachable
    Offline,
    /// Backend slower than the slow-connection threshold
    Slow,
}

#[derive(Debug, Parser)]
#[command(name = "app-host", about = "Boot the Congregation app core against an in-memory backend")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend scenario to seed
    #[arg(long, value_enum, default_value = "member")]
    scenario: Scenario,
}

fn seed(gateway: &MemoryGateway, scenario: Scenario, config: &AppConfig) {
    match scenario {
        Scenario::SignedOut => {}
        Scenario::Member => {
            let id = gateway.register_account("ana.souza@example.org", "secret1", Some("Ana Souza"));
            gateway.restore_session(gateway.session_for(&id));
        }
        Scenario::Admin => {
            let id = gateway.register_account("pastor@example.org", "secret1", Some("Pastor"));
            gateway.put_profile(Profile {
                id: id.clone(),
                email: "pastor@example.org".into(),
                name: "Pastor".into(),
                elevated: true,
            });
            gateway.restore_session(gateway.session_for(&id));
        }
        Scenario::Offline => gateway.go_offline(),
        Scenario::Slow => {
            let id = gateway.register_account("ana.souza@example.org", "secret1", None);
            gateway.restore_session(gateway.session_for(&id));
            gateway.set_session_latency(Some(config.slow_after() + Duration::from_secs(1)));
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_filter))
                .context("invalid log filter")?,
        )
        .init();

    let gateway = Arc::new(MemoryGateway::new());
    seed(&gateway, args.scenario, &config);

    let ui = UiAuthContext::new(AuthContext::new(gateway.clone(), config));
    let snapshot = ui.raw().start().await;

    println!("phase: {}", snapshot.phase);
    match &snapshot.session {
        Some(session) => println!("session: {}", session.user_id()),
        None => println!("session: none"),
    }
    if let Some(profile) = &snapshot.profile {
        println!(
            "profile: {} <{}> elevated={}",
            profile.name, profile.email, profile.elevated
        );
    }

    match ui.screen() {
        Screen::Loading { message, .. } => println!("screen: loading ({message})"),
        Screen::ConnectionError { message } => {
            println!("screen: connection error ({message})");
            println!("retry available");
        }
        Screen::Routed { nav, offer_retry } => {
            println!("nav: {nav:?}");
            let menu: Vec<&str> = nav.menu().iter().map(Route::label).collect();
            println!("menu: {}", menu.join(", "));
            for path in ["/", "/dashboard", "/admin", "/nowhere"] {
                println!("{path} -> {:?}", nav.resolve_path(path));
            }
            if offer_retry {
                println!("retry available");
            }
        }
    }

    if matches!(args.scenario, Scenario::Offline) {
        // Backend comes back; the retry affordance should recover.
        gateway.fail_session_fetch(None);
        let snapshot = ui.raw().retry().await;
        println!("after retry: {}", snapshot.phase);
    }

    ui.raw().dispose().await;
    Ok(())
}
