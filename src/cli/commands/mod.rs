pub mod config;
pub mod purchase;
pub mod system;
pub mod view;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = view::definitions()
        .into_iter()
        .chain(purchase::definitions())
        .chain(config::definitions())
        .chain(system::definitions());
    for entry in definitions {
        registry.register(entry);
    }
}
