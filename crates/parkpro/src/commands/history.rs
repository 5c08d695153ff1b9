//! History ledger handlers.

use parkpro_core::billing::format_currency;
use parkpro_core::{Controller, HistoryLedger, LedgerSummary, SessionId, SortKey, SortOrder};

use crate::cli::{
    DocumentFormat, GlobalOpts, HistoryArgs, HistoryCommand, LedgerArgs, OutputFormat, SortArg,
};
use crate::error::CliError;
use crate::output;

use super::sessions::{SessionRow, SessionView};
use super::util;

fn sort_key_of(arg: SortArg) -> SortKey {
    match arg {
        SortArg::ExitTime => SortKey::ExitTime,
        SortArg::EntryTime => SortKey::EntryTime,
        SortArg::Owner => SortKey::OwnerName,
        SortArg::Vehicle => SortKey::VehicleName,
    }
}

fn apply(ledger: &mut HistoryLedger, args: LedgerArgs) {
    if let Some(term) = args.search {
        ledger.set_search(term);
    }
    ledger.set_sort_key(sort_key_of(args.sort));
    ledger.set_sort_order(if args.asc {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    });
}

fn summary_detail(s: &LedgerSummary) -> String {
    [
        format!("Total sessions:    {}", s.sessions),
        format!("Total revenue:     {}", format_currency(s.total_revenue)),
        format!("Average duration:  {:.1}h", s.average_hours),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut ledger = HistoryLedger::new();
    ledger.refresh(controller).await?;
    let now = util::now();

    match args.command {
        HistoryCommand::List(opts) => {
            apply(&mut ledger, opts);
            let views: Vec<SessionView<'_>> = ledger
                .visible()
                .into_iter()
                .map(|s| SessionView::new(s, now))
                .collect();

            if views.is_empty() && matches!(global.output, OutputFormat::Table) {
                output::print_output(ledger.empty_message(), global.quiet);
                return Ok(());
            }

            let out = output::render_list(
                global.output,
                &views,
                |v| SessionRow::from(v),
                SessionView::id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Summary => {
            let summary = ledger.summary();
            let out = output::render_single(global.output, &summary, summary_detail, |s| {
                s.sessions.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Delete { id } => {
            let id = SessionId::from(id.as_str());
            let session = util::find_session(ledger.rows(), &id, "history list")?;
            let prompt = format!(
                "Delete transaction {id} ({}, slot {})?",
                session.plate_number,
                session.slot_label()
            );
            if !util::confirm(&prompt, global.yes, "history delete")? {
                return Ok(());
            }

            let mut warnings = controller.warnings();
            ledger.arm_delete(id.clone());
            let Some(handle) = ledger.confirm_delete(&id, controller) else {
                return Ok(());
            };
            if !global.quiet {
                eprintln!("Transaction {id} removed");
            }

            // The process must not exit before the store answers.
            handle
                .await
                .map_err(|e| CliError::Internal(format!("delete task failed: {e}")))?;

            if let Ok(warning) = warnings.try_recv() {
                ledger.set_warning(warning);
            }
            if let Some(warning) = ledger.last_warning() {
                let color = output::should_color(global.color);
                eprintln!(
                    "{} {} ({})",
                    output::caution("warning:", color),
                    warning.message,
                    warning.detail
                );
            }
            Ok(())
        }

        HistoryCommand::Export {
            ledger: opts,
            format,
            out,
        } => {
            apply(&mut ledger, opts);
            let report = ledger.export(now);
            let content = match format {
                DocumentFormat::Text => report.render_text(),
                DocumentFormat::Html => report.render_html(),
            };
            output::write_document(&content, out.as_deref(), global.quiet)
        }

        HistoryCommand::Receipt { id, format, out } => {
            let id = SessionId::from(id.as_str());
            let receipt = ledger.receipt(&id, now).ok_or_else(|| CliError::NotFound {
                identifier: id.to_string(),
                list_command: "history list".into(),
            })?;
            let content = match format {
                DocumentFormat::Text => receipt.render_text(),
                DocumentFormat::Html => receipt.render_html(),
            };
            output::write_document(&content, out.as_deref(), global.quiet)
        }
    }
}
