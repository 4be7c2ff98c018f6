use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::client::{ActivityId, SourceClient, UserId};
use crate::config::AppConfig;
use crate::logger::log_to_file;
use crate::store::FileCursorStore;
use crate::sync::CursorInitializer;

/// Set the last synced activity for a user.
///
/// Signs in to the source only when `user_id` is not given, to look up the
/// owner of `last_activity`.
pub fn handle_init_cursor(
    config_path: Option<&Path>,
    database: Option<&Path>,
    user_id: Option<String>,
    last_activity: u64,
) -> Result<()> {
    let config = AppConfig::load_or_default_path(config_path)?;
    let store_path = config.store_path(database)?;
    let mut store = FileCursorStore::open(&store_path)?;

    let user_id = user_id.map(UserId::new);
    let source = match user_id {
        Some(_) => None,
        None => Some(super::connect_source(&config.source)?),
    };

    let mut initializer = CursorInitializer::new(
        source.as_ref().map(|s| s as &dyn SourceClient),
        &mut store,
    );
    let user_id = initializer.init(user_id, ActivityId(last_activity))?;

    log_to_file(&format!(
        "Initialized cursor for user {} to activity {}",
        user_id, last_activity
    ))
    .ok();

    println!(
        "  {} Last synced activity for user {} set to {}",
        "✓".green(),
        user_id.to_string().cyan(),
        last_activity
    );
    println!("  Store: {}", store_path.display());

    Ok(())
}
