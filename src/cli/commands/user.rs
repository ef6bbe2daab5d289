use anyhow::bail;
use clap::Args;
use serde_json::json;

use crate::auth;
use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::database::models::{NewUser, UserRole};
use crate::database::{DatabaseError, PgStore, Store};
use crate::services::validation::{validate_email_format, validate_name, validate_password};

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[arg(long, help = "Display name")]
    pub name: String,

    #[arg(long, help = "Login email")]
    pub email: String,

    #[arg(long, help = "Initial password (at least 6 characters)")]
    pub password: String,

    #[arg(long, default_value = "superadmin", help = "superadmin, coordinator, leader or student")]
    pub role: UserRole,

    #[arg(long, help = "Course identifier")]
    pub course_id: Option<String>,

    #[arg(long, help = "Academic period, e.g. 2024.1")]
    pub period_semester: Option<String>,
}

pub async fn handle(args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if matches!(args.role, UserRole::Pending | UserRole::Inactive) {
        bail!("role must be superadmin, coordinator, leader or student");
    }

    let name = validate_name(Some(args.name.as_str())).map_err(anyhow::Error::msg)?;
    let email = validate_email_format(Some(args.email.as_str())).map_err(anyhow::Error::msg)?;
    let password = validate_password(Some(args.password.as_str())).map_err(anyhow::Error::msg)?;

    let config = crate::config::config();
    let password_hash = auth::hash_password(&password, config.security.bcrypt_cost).await?;

    let store = PgStore::new(connect().await?);
    let user = match store
        .insert_user(NewUser {
            name,
            email,
            password_hash,
            role: args.role,
            course_id: args.course_id,
            period_semester: args.period_semester,
        })
        .await
    {
        Ok(user) => user,
        Err(DatabaseError::Conflict(_)) => bail!("an account with email '{}' already exists", args.email.trim()),
        Err(e) => return Err(e.into()),
    };

    output_success(
        &output_format,
        &format!("Created {} {} ({})", user.role, user.email, user.id),
        Some(json!({ "id": user.id, "email": user.email, "role": user.role })),
    )
}
