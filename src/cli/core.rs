//! Core CLI loop, dispatch, and shell context helpers.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::client::HttpRecordClient;
use crate::config::{Config, ConfigManager};
use crate::errors::{ClientError, ConfigError, ServiceError};
use crate::purchase::{MonthFilter, PurchaseRecord, RecordId};
use crate::service::PurchaseService;

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Failures that stop the shell before or outside command dispatch.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

/// Errors returned by command handlers. None of them end the shell.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error("exit requested")]
    ExitRequested,
}

fn build_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

impl ShellContext {
    /// Builds the shell from the configuration under the data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load_effective()?;
        Self::with_config(mode, config_manager, config)
    }

    /// Builds the shell around an already loaded configuration. No request is
    /// sent until [`ShellContext::load_initial`] or a command needs one.
    pub fn with_config(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let client = HttpRecordClient::from_config(&config)?;
        let service = PurchaseService::new(client, config.limits);

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            locale: config.locale_config(),
            currency: config.currency_code(),
            config,
            service,
            runtime: build_runtime()?,
            filter: MonthFilter::All,
            last_listing: Vec::new(),
            last_command: None,
            running: true,
        })
    }

    /// Fetches the collection once at startup. Failures are reported and the
    /// shell keeps running on an empty list.
    pub fn load_initial(&mut self) {
        match self.runtime.block_on(self.service.refresh()) {
            Ok(_) => cli_io::print_info(format!(
                "{} compra(s) carregada(s) de {}",
                self.service.store().len(),
                self.service.client().collection_url()
            )),
            Err(err) => {
                warn!(error = %err, "initial fetch failed");
                cli_io::print_warning(format!("Não foi possível carregar as compras: {err}"));
                cli_io::print_hint("Use `refresh` to try again.");
            }
        }
    }

    /// Re-applies configuration after a `config set`.
    pub(crate) fn apply_config(&mut self, config: Config) -> Result<(), CommandError> {
        let client = HttpRecordClient::from_config(&config)?;
        self.service.replace_client(client);
        self.service.set_limits(config.limits);
        self.locale = config.locale_config();
        self.currency = config.currency_code();
        self.config = config;
        Ok(())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("racao [{}]> ", self.filter)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            debug!(command, state = %self.status(), "dispatching command");
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()
            .map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Service(ServiceError::Validation(errors)) => {
                for (field, error) in errors.iter() {
                    self.print_error(&format!("{}: {}", field.label(), error));
                }
                Ok(())
            }
            CommandError::Service(ServiceError::Client(err)) | CommandError::Client(err) => {
                self.print_error(&format!("Falha na comunicação com o servidor: {err}"));
                self.print_hint("The list still shows the last successful fetch.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    /// Resolves `#n` (row of the last listing) or a raw id to a stored record.
    pub(crate) fn resolve_record(&self, reference: &str) -> Result<PurchaseRecord, CommandError> {
        let id = match reference.strip_prefix('#') {
            Some(position) => {
                let index = position
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .ok_or_else(|| {
                        CommandError::InvalidArguments(format!("`{reference}` is not a row number"))
                    })?;
                self.last_listing.get(index).cloned().ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "No row {reference} in the last listing. Run `list` first."
                    ))
                })?
            }
            None => RecordId::new(reference),
        };
        self.service
            .store()
            .find(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id).into())
    }
}

/// Closest registered name within an edit distance of three.
pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let input = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &input), name))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}
