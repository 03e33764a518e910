use super::{CommandContext, resolve_id, truncate};
use crate::EmployeeCommands;
use anyhow::{Result, anyhow, bail};
use rolegate_client::admin::{EmployeesController, RoleFilter};

pub fn handle_employee_command(ctx: &CommandContext, command: EmployeeCommands) -> Result<()> {
    ctx.require_admin()?;
    let mut controller = EmployeesController::new(ctx.notice_board());
    ctx.block_on(controller.load(&ctx.api))
        .map_err(|e| anyhow!(e.user_message("Failed to fetch employee data")))?;

    match command {
        EmployeeCommands::List { search, roles } => list_employees(&mut controller, search, &roles),
        EmployeeCommands::Assign { employee_id, role } => assign_role(ctx, &mut controller, &employee_id, role),
        EmployeeCommands::RemoveRole { employee_id, yes } => remove_role(ctx, &mut controller, &employee_id, yes),
    }
}

fn list_employees(controller: &mut EmployeesController, search: Option<String>, roles: &[String]) -> Result<()> {
    controller.set_search(search.unwrap_or_default());
    let filter = roles
        .iter()
        .map(|raw| match RoleFilter::parse(raw) {
            RoleFilter::NoRole => Ok(RoleFilter::NoRole),
            RoleFilter::Role(_) => resolve_id(controller.roles(), raw, |r| &r.id)
                .map(RoleFilter::Role)
                .ok_or_else(|| anyhow!("Role {} not found", raw)),
        })
        .collect::<Result<Vec<_>>>()?;
    controller.set_role_filter(filter);

    let employees = controller.filtered();
    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }

    println!("Employees:");
    println!("{:<8} {:<10} {:<26} {:<32} {:<20}", "ID", "Code", "Name", "Email", "Role");
    println!("{}", "-".repeat(100));

    for employee in employees {
        let role = employee
            .role
            .as_ref()
            .map(|r| r.role_name.clone().unwrap_or_else(|| r.id.to_string()))
            .unwrap_or_else(|| "No role".to_string());
        println!(
            "{:<8} {:<10} {:<26} {:<32} {:<20}",
            truncate(&employee.id.to_string(), 8),
            truncate(employee.employee_id.as_deref().unwrap_or("-"), 10),
            truncate(&employee.display_name(), 26),
            truncate(employee.email.as_deref().unwrap_or("-"), 32),
            truncate(&role, 20)
        );
    }

    Ok(())
}

fn assign_role(ctx: &CommandContext, controller: &mut EmployeesController, employee_id: &str, role: Option<String>) -> Result<()> {
    let Some(employee_id) = resolve_id(controller.employees(), employee_id, |e| &e.id) else {
        bail!("Employee {} not found", employee_id);
    };
    let role = match role {
        Some(raw) => Some(resolve_id(controller.roles(), &raw, |r| &r.id).ok_or_else(|| anyhow!("Role {} not found", raw))?),
        None => None,
    };

    controller.open_assign(&employee_id);
    controller.select_role(role.clone());
    if ctx.block_on(controller.submit_assignment(&ctx.api)).is_err() {
        let message = controller
            .notices()
            .current_toast()
            .or(controller.notices().current_banner())
            .unwrap_or("Failed to update employee roles");
        bail!("{}", message);
    }

    match role {
        Some(role) => println!("Employee {} now has role {}.", employee_id, role),
        None => println!("Employee {} no longer has a role.", employee_id),
    }
    Ok(())
}

fn remove_role(ctx: &CommandContext, controller: &mut EmployeesController, employee_id: &str, yes: bool) -> Result<()> {
    let Some(employee) = controller.employees().iter().find(|e| e.id.to_string() == employee_id.trim()) else {
        bail!("Employee {} not found", employee_id);
    };
    let Some(role) = employee.role.clone() else {
        bail!("Employee {} has no role to remove", employee_id);
    };
    let (id, name) = (employee.id.clone(), employee.display_name());

    if !yes {
        println!(
            "About to remove role '{}' from {}. Re-run with --yes to confirm.",
            role.role_name.as_deref().unwrap_or("?"),
            name
        );
        return Ok(());
    }

    controller.request_role_removal(&id);
    if ctx.block_on(controller.confirm_role_removal(&ctx.api)).is_err() {
        let message = controller
            .notices()
            .current_toast()
            .or(controller.notices().current_banner())
            .unwrap_or("Failed to remove role");
        bail!("{}", message);
    }
    println!("Role removed from {}.", name);
    Ok(())
}
