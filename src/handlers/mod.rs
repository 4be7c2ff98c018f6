//! Command handler modules
//!
//! Each CLI subcommand is implemented by one handler. Handlers load the
//! configuration, open the cursor store and sign in to the services they
//! need, then hand off to the library.

pub mod cursor;
pub mod status;
pub mod sync;

pub use cursor::handle_init_cursor;
pub use status::handle_status;
pub use sync::handle_sync;

use anyhow::{anyhow, Context, Result};

use crate::client::GarminClient;
use crate::config::SourceConfig;

/// Sign in to the source, prompting for the password on a terminal when the
/// configuration does not contain one.
pub(crate) fn connect_source(config: &SourceConfig) -> Result<GarminClient> {
    let password = match &config.password {
        Some(password) => password.clone(),
        None if is_interactive() => {
            inquire::Password::new(&format!("Garmin Connect password for {}:", config.username))
                .without_confirmation()
                .prompt()
                .context("Password prompt cancelled")?
        }
        None => {
            return Err(anyhow!(
                "No source password configured and no terminal to prompt on; set source.password"
            ))
        }
    };

    GarminClient::login(config, &password)
}

fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}
