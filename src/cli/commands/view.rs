use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::currency::{format_currency_value, format_date, format_kilograms};
use crate::purchase::{MonthFilter, PurchaseRecord};

/// Caption printed next to the filtered total.
pub const TOTAL_CAPTION: &str = "valor total gasto";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "list",
            "List purchases, newest first",
            "list [mês]",
            cmd_list,
        ),
        CommandEntry::new(
            "months",
            "Show the months that have purchases",
            "months",
            cmd_months,
        ),
        CommandEntry::new(
            "filter",
            "Set or show the active month filter",
            "filter [mês|todos]",
            cmd_filter,
        ),
        CommandEntry::new(
            "total",
            "Show the amount spent in the active or given month",
            "total [mês]",
            cmd_total,
        ),
    ]
}

/// Filter named by `args`, or the active one when none is given.
fn requested_filter(context: &ShellContext, args: &[&str]) -> Result<MonthFilter, CommandError> {
    if args.is_empty() {
        return Ok(context.filter);
    }
    let input = args.join(" ");
    MonthFilter::parse(&input, &context.service.store().months()).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "Unknown month `{input}`. Use `months` to see the options."
        ))
    })
}

fn purchase_row(context: &ShellContext, position: usize, record: &PurchaseRecord) -> Vec<String> {
    vec![
        format!("#{position}"),
        record.brand.clone(),
        format_kilograms(&context.locale, record.quantity),
        format_date(&context.locale, record.date),
        format_currency_value(record.price, &context.currency, &context.locale),
        record.id.to_string(),
    ]
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = requested_filter(context, args)?;
    let store = context.service.store();
    let records = store.filtered(&filter);

    output_section(format!("Compras: {filter}"));
    if records.is_empty() {
        if store.is_loaded() {
            io::print_info("Nenhuma compra encontrada.");
        } else {
            io::print_info("A lista ainda não foi carregada. Use `refresh`.");
        }
    } else {
        let mut table = Table::new(vec![
            TableColumn::left("#"),
            TableColumn::left("Marca"),
            TableColumn::right("Quantidade"),
            TableColumn::left("Data"),
            TableColumn::right("Valor"),
            TableColumn::left("ID").max_width(24),
        ]);
        for (idx, record) in records.iter().enumerate() {
            table.push_row(purchase_row(context, idx + 1, record));
        }
        io::print_info(table.render());
    }

    let listing: Vec<_> = records.iter().map(|record| record.id.clone()).collect();
    let total = store.formatted_total(&filter, &context.currency, &context.locale);
    io::print_info(format!("{TOTAL_CAPTION}: {total}"));
    context.last_listing = listing;
    Ok(())
}

fn cmd_months(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Meses");
    for option in context.service.store().available_months() {
        let marker = if option == context.filter { "*" } else { " " };
        io::print_info(format!(" {marker} {option}"));
    }
    Ok(())
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        io::print_info(format!("Filtro atual: {}", context.filter));
        return Ok(());
    }
    let filter = requested_filter(context, args)?;
    context.filter = filter;
    io::print_success(format!("Filtro: {filter}"));
    Ok(())
}

fn cmd_total(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = requested_filter(context, args)?;
    let total = context
        .service
        .store()
        .formatted_total(&filter, &context.currency, &context.locale);
    io::print_info(format!("{TOTAL_CAPTION} ({filter}): {total}"));
    Ok(())
}
