use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::forms;
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::currency::{format_currency_value, format_date};
use crate::purchase::PurchaseDraft;
use crate::service::MutationOutcome;

pub const CREATED_MESSAGE: &str = "Compra inserida com sucesso";
pub const UPDATED_MESSAGE: &str = "Produto alterado com sucesso";
pub const DELETED_MESSAGE: &str = "Produto excluído com sucesso";
pub const DELETE_CONFIRMATION: &str = "Você tem certeza? O processo não poderá ser revertido";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Register a purchase",
            "add [marca=… quantidade=… valor=… data=…]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Change a purchase",
            "edit <id|#n> [campo=valor …]",
            cmd_edit,
        ),
        CommandEntry::new(
            "delete",
            "Remove a purchase",
            "delete <id|#n> [--yes]",
            cmd_delete,
        ),
        CommandEntry::new(
            "refresh",
            "Reload purchases from the server",
            "refresh",
            cmd_refresh,
        ),
    ]
}

/// Builds a draft from arguments, or from the interactive form when none are
/// given.
fn collect_draft(
    context: &ShellContext,
    initial: PurchaseDraft,
    args: &[&str],
    usage: &str,
) -> Result<PurchaseDraft, CommandError> {
    if !args.is_empty() {
        let mut draft = initial;
        forms::apply_assignments(&mut draft, args)?;
        return Ok(draft);
    }
    match context.mode {
        CliMode::Interactive => forms::prompt_draft(context, initial),
        CliMode::Script => Err(CommandError::InvalidArguments(format!("usage: {usage}"))),
    }
}

fn report_outcome(outcome: &MutationOutcome, message: &str) {
    io::print_success(message);
    if !outcome.refreshed {
        io::print_warning("A lista não pôde ser atualizada. Use `refresh`.");
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let draft = collect_draft(
        context,
        PurchaseDraft::default(),
        args,
        "add marca=… quantidade=… valor=… data=…",
    )?;
    let outcome = context.runtime.block_on(context.service.add(&draft))?;
    report_outcome(&outcome, CREATED_MESSAGE);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (reference, assignments) = args.split_first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: edit <id|#n> [campo=valor …]".into())
    })?;
    let record = context.resolve_record(reference)?;
    let draft = collect_draft(
        context,
        PurchaseDraft::from_record(&record),
        assignments,
        "edit <id|#n> campo=valor …",
    )?;
    let outcome = context
        .runtime
        .block_on(context.service.edit(&record.id, &draft))?;
    report_outcome(&outcome, UPDATED_MESSAGE);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let confirmed_by_flag = args.iter().any(|arg| matches!(*arg, "--yes" | "-y"));
    let reference = args
        .iter()
        .find(|arg| !arg.starts_with('-'))
        .ok_or_else(|| CommandError::InvalidArguments("usage: delete <id|#n> [--yes]".into()))?;
    let record = context.resolve_record(reference)?;

    if !confirmed_by_flag && context.mode == CliMode::Interactive {
        io::print_info(format!(
            "{} · {} · {}",
            record.brand,
            format_date(&context.locale, record.date),
            format_currency_value(record.price, &context.currency, &context.locale)
        ));
        if !io::confirm_action(&context.theme, DELETE_CONFIRMATION, false)? {
            io::print_info("Exclusão cancelada.");
            return Ok(());
        }
    }

    let outcome = context.runtime.block_on(context.service.remove(&record.id))?;
    report_outcome(&outcome, DELETED_MESSAGE);
    Ok(())
}

fn cmd_refresh(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.runtime.block_on(context.service.refresh())?;
    io::print_success(format!(
        "{} compra(s) carregada(s)",
        context.service.store().len()
    ));
    Ok(())
}
