use dialoguer::theme::ColorfulTheme;
use tokio::runtime::Runtime;

use crate::client::HttpRecordClient;
use crate::config::{Config, ConfigManager};
use crate::currency::{CurrencyCode, LocaleConfig};
use crate::purchase::{MonthFilter, RecordId};
use crate::service::PurchaseService;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    /// Effective configuration: the stored file plus environment overrides.
    pub config: Config,
    pub locale: LocaleConfig,
    pub currency: CurrencyCode,
    pub service: PurchaseService<HttpRecordClient>,
    pub runtime: Runtime,
    pub filter: MonthFilter,
    /// Ids of the rows printed by the last `list`, addressable as `#n`.
    pub last_listing: Vec<RecordId>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, filter: {}, records: {} }}",
            self.running,
            self.last_command,
            self.filter,
            self.service.store().len()
        )
    }
}
