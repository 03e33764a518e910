use super::CommandContext;
use anyhow::{Result, bail};
use rolegate_client::models::AdminUser;
use rolegate_client::{AdminSession, PermissionGate, auth};

pub fn login(ctx: &CommandContext, federated_token: Option<String>, email: Option<String>, password: Option<String>) -> Result<()> {
    let credential = match (federated_token, email, password) {
        (Some(token), _, _) => ctx.block_on(auth::federated_login(&ctx.api, &ctx.store, &token, &ctx.config.auth.allowed_domain)),
        (None, Some(email), Some(password)) => ctx.block_on(auth::email_login(&ctx.api, &ctx.store, &email, &password)),
        _ => bail!("Provide --federated-token, or --email together with --password"),
    }
    .map_err(|e| anyhow::anyhow!(e.user_message("Login failed")))?;

    println!("Signed in.");
    println!("  Method: {}", credential.login_method.as_deref().unwrap_or("-"));
    println!("  Expires: {}", credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

pub fn admin_login(ctx: &CommandContext, token: String, id: Option<String>, name: Option<String>, email: Option<String>) -> Result<()> {
    if token.trim().is_empty() {
        bail!("Admin token must not be empty");
    }
    let session = AdminSession {
        token: token.trim().to_string(),
        user: AdminUser { id, name, email },
    };
    ctx.store.save_admin_session(&session)?;

    // validate right away so a bad token is not left behind
    let session = ctx.require_admin()?;
    println!("Admin session stored for {}.", session.user.name.as_deref().or(session.user.email.as_deref()).unwrap_or("admin"));
    Ok(())
}

pub fn logout(ctx: &CommandContext) -> Result<()> {
    ctx.block_on(auth::logout(&ctx.api, &ctx.store))?;
    println!("Signed out. Stored credentials removed from {}.", ctx.store.dir().display());
    Ok(())
}

pub fn whoami(ctx: &CommandContext) -> Result<()> {
    println!("Admin Session");
    println!("=============");
    match ctx.store.admin_session() {
        Ok(Some(session)) => {
            println!("  Name: {}", session.user.name.as_deref().unwrap_or("-"));
            println!("  Email: {}", session.user.email.as_deref().unwrap_or("-"));
        }
        Ok(None) => println!("  Not signed in"),
        Err(e) => println!("  Unreadable: {}", e),
    }
    println!();

    println!("Service Credential");
    println!("==================");
    match ctx.store.service_credential()? {
        Some(credential) => {
            let email = credential
                .user
                .as_ref()
                .and_then(|u| u.get("email"))
                .and_then(|e| e.as_str())
                .unwrap_or("-");
            println!("  Email: {}", email);
            println!("  Method: {}", credential.login_method.as_deref().unwrap_or("-"));
            println!("  Expires: {}", credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));

            let mut gate = PermissionGate::new();
            match ctx.block_on(gate.load(&ctx.api, false)) {
                Ok(()) => {
                    let names = gate.permissions();
                    if names.is_empty() {
                        println!("  Permissions: none");
                    } else {
                        println!("  Permissions: {}", names.join(", "));
                    }
                }
                Err(e) => println!("  Permissions: unavailable ({})", e.user_message("request failed")),
            }
        }
        None => println!("  Not signed in (or expired)"),
    }
    Ok(())
}
