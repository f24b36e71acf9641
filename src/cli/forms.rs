//! Purchase form: interactive prompts and `campo=valor` arguments.

use dialoguer::Input;

use crate::cli::core::{CommandError, ShellContext};
use crate::purchase::{Field, PurchaseDraft};
use crate::validation::validate_field;

/// Applies `campo=valor` arguments on top of `draft`.
pub fn apply_assignments(draft: &mut PurchaseDraft, args: &[&str]) -> Result<(), CommandError> {
    for arg in args {
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("Expected `campo=valor`, got `{arg}`"))
        })?;
        let field = Field::from_key(key).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "Unknown field `{key}` (expected one of: marca, quantidade, valor, data)"
            ))
        })?;
        draft.set(field, value.trim());
    }
    Ok(())
}

/// Prompts for every field, starting from `initial`.
///
/// Each answer is checked as soon as it is entered; an invalid value shows
/// its message under the prompt and asks again.
pub fn prompt_draft(
    context: &ShellContext,
    initial: PurchaseDraft,
) -> Result<PurchaseDraft, CommandError> {
    let limits = *context.service.limits();
    let mut draft = initial;

    for field in Field::ALL {
        let current = draft.get(field).to_string();
        let mut input = Input::<String>::with_theme(&context.theme)
            .with_prompt(prompt_label(field))
            .allow_empty(true)
            .validate_with(move |value: &String| -> Result<(), String> {
                validate_field(field, value, &limits).map_err(|err| err.message)
            });
        if !current.is_empty() {
            input = input.with_initial_text(current);
        }
        let value = input.interact_text()?;
        draft.set(field, value.trim());
    }

    Ok(draft)
}

fn prompt_label(field: Field) -> String {
    match field {
        Field::Quantity => format!("{} (kg)", field.label()),
        Field::Price => format!("{} (R$)", field.label()),
        Field::Date => format!("{} (AAAA-MM-DD ou DD/MM/AAAA)", field.label()),
        Field::Brand => field.label().to_string(),
    }
}
