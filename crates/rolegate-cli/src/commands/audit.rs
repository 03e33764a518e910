use super::{CommandContext, truncate};
use crate::AuditCommands;
use anyhow::{Result, anyhow, bail};
use rolegate_client::audit::AuditLogViewer;
use rolegate_client::models::ActionKind;
use rolegate_client::{AUDIT_LOG_VIEW, ConsoleError};

pub fn handle_audit_command(ctx: &CommandContext, command: AuditCommands) -> Result<()> {
    let mut viewer = AuditLogViewer::new(ctx.api.config().effective_audit_fetch_size(), ctx.config.ui.audit_page_size);
    match command {
        AuditCommands::List {
            action,
            page_name,
            from,
            to,
            page,
        } => list_audit(ctx, &mut viewer, action, page_name, from, to, page),
        AuditCommands::Stats => show_stats(ctx, &mut viewer),
        AuditCommands::Pages => list_pages(ctx, &mut viewer),
    }
}

fn access_denied() -> anyhow::Error {
    anyhow!("Access Denied: the '{}' permission is required to view audit logs", AUDIT_LOG_VIEW)
}

/// Parse an action kind as typed on the command line
pub fn parse_action(raw: &str) -> ActionKind {
    ActionKind::from(raw.trim().to_uppercase().replace([' ', '-'], "_"))
}

fn list_audit(
    ctx: &CommandContext,
    viewer: &mut AuditLogViewer,
    action: Option<String>,
    page_name: Option<String>,
    from: Option<String>,
    to: Option<String>,
    page: usize,
) -> Result<()> {
    if let Err(e) = ctx.block_on(viewer.load(&ctx.api)) {
        if matches!(e, ConsoleError::AccessDenied { .. }) {
            return Err(access_denied());
        }
        bail!("{}", viewer.error().map(str::to_string).unwrap_or_else(|| e.user_message("Failed to fetch audit logs")));
    }

    viewer.set_action_type(action.as_deref().map(parse_action));
    viewer.set_page_name(page_name);
    viewer.set_start_date(from.as_deref().unwrap_or(""))?;
    viewer.set_end_date(to.as_deref().unwrap_or(""))?;
    if page > 1 && !viewer.go_to_page(page) {
        bail!("Page {} is out of range (1-{})", page, viewer.pager().total_pages().max(1));
    }

    if let Some(report) = viewer.last_report() {
        if !report.failed_pages.is_empty() {
            eprintln!("Warning: skipped backend pages {:?}; results are incomplete.", report.failed_pages);
        }
    }

    let rows = viewer.visible();
    if rows.is_empty() {
        println!("No audit records found.");
        return Ok(());
    }

    println!("{:<20} {:<22} {:<28} {:<20} {:<20}", "Timestamp", "User", "Email", "Page", "Action");
    println!("{}", "-".repeat(114));
    for entry in rows {
        println!(
            "{:<20} {:<22} {:<28} {:<20} {:<20}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            truncate(entry.user_name.as_deref().unwrap_or("-"), 22),
            truncate(entry.user_email.as_deref().unwrap_or("-"), 28),
            truncate(entry.action_page.as_deref().unwrap_or("-"), 20),
            entry.action_performed.label()
        );
    }

    let pager = viewer.pager();
    let (start, end) = pager.bounds();
    println!();
    println!(
        "Showing {}-{} of {} (page {} of {})",
        start + 1,
        end,
        pager.total_count(),
        pager.current_page(),
        pager.total_pages()
    );
    Ok(())
}

fn show_stats(ctx: &CommandContext, viewer: &mut AuditLogViewer) -> Result<()> {
    if !ctx.block_on(viewer.check_access(&ctx.api)) {
        return Err(access_denied());
    }
    ctx.block_on(viewer.fetch_stats(&ctx.api));
    if let Some(error) = viewer.error() {
        bail!("{}", error);
    }
    let Some(stats) = viewer.stats() else {
        bail!("Audit statistics are unavailable");
    };

    println!("Audit Statistics");
    println!("================");
    println!("  Total Actions: {}", stats.total_actions);
    println!("  Created: {}", stats.created);
    println!("  Edited: {}", stats.edited);
    println!("  Deleted: {}", stats.deleted);
    Ok(())
}

fn list_pages(ctx: &CommandContext, viewer: &mut AuditLogViewer) -> Result<()> {
    if !ctx.block_on(viewer.check_access(&ctx.api)) {
        return Err(access_denied());
    }
    ctx.block_on(viewer.fetch_catalog(&ctx.api));

    if viewer.catalog().is_empty() {
        println!("No pages recorded.");
        return Ok(());
    }
    println!("Pages:");
    for page in viewer.catalog() {
        println!("  {}", page);
    }
    Ok(())
}
