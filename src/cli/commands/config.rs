use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::config::Config;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|get <key>|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "get" => {
            let key = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config get <key>".into())
            })?;
            let value = context.config.value_of(key).ok_or_else(|| unknown_key(key))?;
            io::print_info(format!("{key} = {value}"));
            Ok(())
        }
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            set_config_value(context, key, value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`"
        ))),
    }
}

fn unknown_key(key: &str) -> CommandError {
    CommandError::InvalidArguments(format!(
        "unknown setting `{key}` (expected one of: {})",
        Config::KEYS.join(", ")
    ))
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for key in Config::KEYS {
        if let Some(value) = context.config.value_of(key) {
            io::print_info(format!("  {key:<22}: {value}"));
        }
    }
    io::print_info(format!(
        "  {:<22}: {}",
        "file",
        context.config_manager.path().display()
    ));
    Ok(())
}

/// Persists the change to the stored file and applies it to the running
/// shell. Environment overrides still win over the stored base URL.
fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut stored = context.config_manager.load()?;
    stored.set_value(key, value)?;
    context.config_manager.save(&stored)?;

    let mut effective = context.config.clone();
    effective.set_value(key, value)?;
    let effective = effective.with_env_overrides();
    context.apply_config(effective)?;

    io::print_success(format!("{key} set to {value}"));
    Ok(())
}
