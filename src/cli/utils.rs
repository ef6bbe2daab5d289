use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Connects with the same settings the server uses.
pub async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = crate::config::config();
    let pool = DatabaseManager::connect(&config.database).await?;
    Ok(pool)
}
