use super::{CommandContext, resolve_id, truncate};
use crate::PermissionCommands;
use anyhow::{Result, anyhow, bail};
use rolegate_client::admin::PermissionsController;

pub fn handle_permission_command(ctx: &CommandContext, command: PermissionCommands) -> Result<()> {
    ctx.require_admin()?;
    let mut controller = PermissionsController::new(ctx.notice_board());
    ctx.block_on(controller.load(&ctx.api))
        .map_err(|e| anyhow!(e.user_message("Failed to fetch permissions")))?;

    match command {
        PermissionCommands::List { search } => list_permissions(&mut controller, search),
        PermissionCommands::Create { name, description } => create_permission(ctx, &mut controller, name, description),
        PermissionCommands::Edit { id, name, description } => edit_permission(ctx, &mut controller, &id, name, description),
        PermissionCommands::Delete { id, yes } => delete_permission(ctx, &mut controller, &id, yes),
    }
}

fn list_permissions(controller: &mut PermissionsController, search: Option<String>) -> Result<()> {
    controller.set_search(search.unwrap_or_default());
    let permissions = controller.filtered();

    if permissions.is_empty() {
        println!("No permissions found.");
        return Ok(());
    }

    println!("Permissions:");
    println!("{:<10} {:<30} {:<40} {:<20}", "ID", "Name", "Description", "Created");
    println!("{}", "-".repeat(100));

    for permission in permissions {
        println!(
            "{:<10} {:<30} {:<40} {:<20}",
            truncate(&permission.id.to_string(), 10),
            truncate(&permission.permission_name, 30),
            truncate(permission.permission_description.as_deref().unwrap_or("-"), 40),
            permission
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    Ok(())
}

fn create_permission(ctx: &CommandContext, controller: &mut PermissionsController, name: String, description: String) -> Result<()> {
    controller.open_create();
    if let Some(form) = controller.form_mut() {
        form.permission_name = name;
        form.permission_description = description;
    }
    submit(ctx, controller)?;
    println!("Permission created.");
    Ok(())
}

fn edit_permission(
    ctx: &CommandContext,
    controller: &mut PermissionsController,
    id: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let Some(id) = resolve_id(controller.permissions(), id, |p| &p.id) else {
        bail!("Permission {} not found", id);
    };
    controller.open_edit(&id);
    if let Some(form) = controller.form_mut() {
        if let Some(name) = name {
            form.permission_name = name;
        }
        if let Some(description) = description {
            form.permission_description = description;
        }
    }
    submit(ctx, controller)?;
    println!("Permission {} updated.", id);
    Ok(())
}

fn submit(ctx: &CommandContext, controller: &mut PermissionsController) -> Result<()> {
    if ctx.block_on(controller.submit(&ctx.api)).is_err() {
        let message = controller
            .notices()
            .current_toast()
            .or(controller.notices().current_banner())
            .unwrap_or("Failed to save permission");
        bail!("{}", message);
    }
    Ok(())
}

fn delete_permission(ctx: &CommandContext, controller: &mut PermissionsController, id: &str, yes: bool) -> Result<()> {
    let Some(permission) = controller.permissions().iter().find(|p| p.id.to_string() == id.trim()) else {
        bail!("Permission {} not found", id);
    };
    let id = permission.id.clone();
    if !yes {
        println!(
            "About to delete permission '{}'. This cannot be undone; re-run with --yes to confirm.",
            permission.permission_name
        );
        return Ok(());
    }

    controller.request_delete(&id);
    if ctx.block_on(controller.confirm_delete(&ctx.api)).is_err() {
        let message = controller.notices().current_banner().unwrap_or("Failed to delete permission");
        bail!("{}", message);
    }
    println!("Permission {} deleted.", id);
    Ok(())
}
