use super::{CommandContext, resolve_id, truncate};
use crate::RoleCommands;
use anyhow::{Result, anyhow, bail};
use rolegate_client::admin::RolesController;
use rolegate_client::models::Id;

pub fn handle_role_command(ctx: &CommandContext, command: RoleCommands) -> Result<()> {
    ctx.require_admin()?;
    let mut controller = RolesController::new(ctx.notice_board());
    ctx.block_on(controller.load(&ctx.api))
        .map_err(|e| anyhow!(e.user_message("Failed to fetch data")))?;

    match command {
        RoleCommands::List { search } => list_roles(&mut controller, search),
        RoleCommands::Create {
            name,
            description,
            permissions,
            all_matching,
        } => create_role(ctx, &mut controller, name, description, &permissions, all_matching),
        RoleCommands::Edit {
            id,
            name,
            description,
            grant,
            revoke,
            clear,
        } => edit_role(ctx, &mut controller, &id, name, description, &grant, &revoke, clear),
        RoleCommands::Delete { id, yes } => delete_role(ctx, &mut controller, &id, yes),
    }
}

fn list_roles(controller: &mut RolesController, search: Option<String>) -> Result<()> {
    controller.set_search(search.unwrap_or_default());
    let roles = controller.filtered();

    if roles.is_empty() {
        println!("No roles found.");
        return Ok(());
    }

    println!("Roles:");
    println!("{:<10} {:<24} {:<36} {:<40}", "ID", "Name", "Description", "Permissions");
    println!("{}", "-".repeat(110));

    for role in roles {
        let names: Vec<&str> = role.permissions.iter().map(|p| p.permission_name.as_str()).collect();
        let permissions = if names.is_empty() { "-".to_string() } else { names.join(", ") };
        println!(
            "{:<10} {:<24} {:<36} {:<40}",
            truncate(&role.id.to_string(), 10),
            truncate(&role.role_name, 24),
            truncate(role.role_description.as_deref().unwrap_or("-"), 36),
            truncate(&permissions, 40)
        );
    }

    Ok(())
}

/// Map typed permission ids onto the ids the backend listed
fn resolve_permissions(controller: &RolesController, raw: &[String]) -> Result<Vec<Id>> {
    raw.iter()
        .map(|r| resolve_id(controller.permissions(), r, |p| &p.id).ok_or_else(|| anyhow!("Permission {} not found", r)))
        .collect()
}

fn create_role(
    ctx: &CommandContext,
    controller: &mut RolesController,
    name: String,
    description: String,
    permissions: &[String],
    all_matching: Option<String>,
) -> Result<()> {
    let ids = resolve_permissions(controller, permissions)?;
    controller.open_create();

    if let Some(term) = all_matching {
        controller.set_picker_search(term);
        controller.select_all_filtered();
    }
    if let Some(form) = controller.form_mut() {
        form.role_name = name;
        form.role_description = description;
    }
    for id in &ids {
        let already = controller.view().form().is_some_and(|f| f.is_selected(id));
        if !already {
            controller.toggle_permission(id);
        }
    }

    submit(ctx, controller)?;
    println!("Role created.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn edit_role(
    ctx: &CommandContext,
    controller: &mut RolesController,
    id: &str,
    name: Option<String>,
    description: Option<String>,
    grant: &[String],
    revoke: &[String],
    clear: bool,
) -> Result<()> {
    let Some(id) = resolve_id(controller.roles(), id, |r| &r.id) else {
        bail!("Role {} not found", id);
    };
    let grant = resolve_permissions(controller, grant)?;
    let revoke = resolve_permissions(controller, revoke)?;

    controller.open_edit(&id);
    if clear {
        controller.deselect_all();
    }
    for permission in &revoke {
        if controller.view().form().is_some_and(|f| f.is_selected(permission)) {
            controller.toggle_permission(permission);
        }
    }
    for permission in &grant {
        if !controller.view().form().is_some_and(|f| f.is_selected(permission)) {
            controller.toggle_permission(permission);
        }
    }
    if let Some(form) = controller.form_mut() {
        if let Some(name) = name {
            form.role_name = name;
        }
        if let Some(description) = description {
            form.role_description = description;
        }
    }

    submit(ctx, controller)?;
    println!("Role {} updated.", id);
    Ok(())
}

fn submit(ctx: &CommandContext, controller: &mut RolesController) -> Result<()> {
    if ctx.block_on(controller.submit(&ctx.api)).is_err() {
        let message = controller
            .notices()
            .current_toast()
            .or(controller.notices().current_banner())
            .unwrap_or("Failed to save role");
        bail!("{}", message);
    }
    Ok(())
}

fn delete_role(ctx: &CommandContext, controller: &mut RolesController, id: &str, yes: bool) -> Result<()> {
    let Some(role) = controller.roles().iter().find(|r| r.id.to_string() == id.trim()) else {
        bail!("Role {} not found", id);
    };
    let id = role.id.clone();
    if !yes {
        println!("About to delete role '{}'. This cannot be undone; re-run with --yes to confirm.", role.role_name);
        return Ok(());
    }

    controller.request_delete(&id);
    if ctx.block_on(controller.confirm_delete(&ctx.api)).is_err() {
        let message = controller.notices().current_banner().unwrap_or("Failed to delete role");
        bail!("{}", message);
    }
    println!("Role {} deleted.", id);
    Ok(())
}
