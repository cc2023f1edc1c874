use clap::Subcommand;

use super::AppContext;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML.
    Show,
    /// Print the settings file location.
    Path,
}

pub fn run(ctx: &AppContext, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", ctx.config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", ctx.settings.path().display());
        }
    }
    Ok(())
}
