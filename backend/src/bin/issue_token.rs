//! Mint a bearer token for an owner using the configured secret.
//!
//! # Examples
//! ```sh
//! TASKFLOW_JWT_SECRET=change-me cargo run --bin issue-token -- --owner user-42
//! ```

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use taskflow::domain::OwnerId;
use taskflow::outbound::auth::JwtAccessTokens;
use taskflow::settings::AppSettings;

/// `issue-token` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "issue-token",
    about = "Mint an HS256 bearer token for a task owner",
    version
)]
struct CliArgs {
    /// Owner id placed in the `sub` claim.
    #[arg(long, value_name = "id")]
    owner: String,
    /// Lifetime in minutes. Defaults to `TASKFLOW_TOKEN_TTL_MINUTES` or 30.
    #[arg(long = "ttl-minutes", value_name = "minutes")]
    ttl_minutes: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = AppSettings::load_from_iter([std::ffi::OsString::from("issue-token")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;

    let secret = settings
        .jwt_secret()
        .ok_or_else(|| eyre!("TASKFLOW_JWT_SECRET must be set to mint tokens"))?;
    let ttl = match args.ttl_minutes {
        Some(0) => return Err(eyre!("--ttl-minutes must be at least 1")),
        Some(minutes) => Duration::from_secs(minutes.saturating_mul(60)),
        None => settings.token_ttl()?,
    };
    let owner = OwnerId::new(args.owner).wrap_err("invalid owner id")?;

    let token = JwtAccessTokens::new(secret)
        .issue(&owner, ttl)
        .wrap_err("failed to sign token")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{token}").wrap_err("failed to write token")?;
    Ok(())
}
