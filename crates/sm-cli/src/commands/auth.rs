use clap::Subcommand;
use sm_api_types::AuthRequest;

use super::{friendly_error, prompt, AppContext};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in to an existing account.
    Login {
        /// Account email address.
        email: String,
    },
    /// Create a new account.
    Register {
        /// Account email address.
        email: String,
    },
}

pub async fn run(ctx: &AppContext, action: AuthAction) -> anyhow::Result<()> {
    let (email, register) = match action {
        AuthAction::Login { email } => (email, false),
        AuthAction::Register { email } => (email, true),
    };

    // Credentials are held in memory only; nothing secret is written to
    // the settings file.
    let password = prompt("Password: ")?;
    let req = AuthRequest { email, password };

    let resp = if register {
        ctx.client.register(&req).await.map_err(friendly_error)?
    } else {
        ctx.client.login(&req).await.map_err(friendly_error)?
    };

    let mut config = ctx.config.clone();
    config.user.id = Some(resp.user.id.clone());
    config.user.display_name = resp.user.display_name.clone();
    ctx.settings.save(&config)?;

    let name = resp.user.display_name.as_deref().unwrap_or(&resp.user.email);
    println!("Logged in as {name} ({}).", resp.user.id);
    Ok(())
}
