use sqlx::mysql::MySqlPool;
use tracing::{debug, warn};

pub mod preferences;

const MIGRATIONS: [&str; 1] = ["migrations/create_tables.sql"];

/// Connect the MySQL pool and create tables
pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;

    create_tables(&pool).await;

    Ok(pool)
}

/// Execute the `//`-delimited statements of a SQL file
async fn execute_sql_file(pool: &MySqlPool, file_path: &str) -> Result<usize, String> {
    let sql_content = std::fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to read {}: {}", file_path, e))?;

    let mut executed = 0;
    for statement in sql_content.split("//").skip(1) {
        let trimmed = statement.trim();
        if trimmed.is_empty() || trimmed == "DELIMITER ;" {
            continue;
        }
        // CREATE ... IF NOT EXISTS; failures here mean the object already exists
        match sqlx::raw_sql(trimmed).execute(pool).await {
            Ok(_) => executed += 1,
            Err(e) => debug!("Skipped statement in {}: {}", file_path, e),
        }
    }

    Ok(executed)
}

async fn create_tables(pool: &MySqlPool) {
    for file in MIGRATIONS {
        match execute_sql_file(pool, file).await {
            Ok(count) => debug!("Applied {} statement(s) from {}", count, file),
            Err(e) => warn!("Failed to create tables: {}", e),
        }
    }
}
