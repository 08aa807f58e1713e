use sqlx::mysql::MySqlPool;
use sqlx::Row;

/// All stored (key, value) pairs for one Discord user
pub async fn get_preferences(
    pool: &MySqlPool,
    discord_id: u64,
) -> Result<Vec<(String, String)>, sqlx::Error> {
    let rows = sqlx::query("SELECT pref_key, pref_value FROM user_preference WHERE discord_id = ?")
        .bind(discord_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| (r.get::<String, _>("pref_key"), r.get::<String, _>("pref_value")))
        .collect())
}

/// Insert or overwrite one preference
pub async fn set_preference(
    pool: &MySqlPool,
    discord_id: u64,
    key: &str,
    value: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_preference (discord_id, pref_key, pref_value) VALUES (?, ?, ?) \
         ON DUPLICATE KEY UPDATE pref_value = VALUES(pref_value)",
    )
    .bind(discord_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_preference(pool: &MySqlPool, discord_id: u64, key: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_preference WHERE discord_id = ? AND pref_key = ?")
        .bind(discord_id)
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
