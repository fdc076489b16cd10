use crate::commands::db;
use crate::models::shop::ShopMeta;
use std::path::Path;

#[tauri::command]
pub async fn open_shop(data_dir: String) -> Result<ShopMeta, String> {
    if !Path::new(&data_dir).exists() {
        return Err("PATH_NOT_FOUND: Directory does not exist".to_string());
    }

    // Initialize SQLite database with migrations.
    let conn = db::get_db_connection(&data_dir)
        .map_err(|e| format!("INIT_FAILED: Could not initialize database: {e}"))?;

    // Initialize settings file with defaults/migrations.
    crate::commands::settings::load_settings_from_disk(&data_dir)
        .map_err(|e| format!("INIT_FAILED: Could not initialize settings: {e}"))?;

    let customer_count =
        db::count_customers(&conn).map_err(|e| format!("Query error: {e}"))? as usize;
    let delinquent_count =
        db::count_delinquents(&conn).map_err(|e| format!("Query error: {e}"))? as usize;
    let last_updated_on = db::last_updated_on(&conn).map_err(|e| format!("Query error: {e}"))?;

    log::info!("opened shop at {data_dir}: {customer_count} customers, {delinquent_count} delinquent");

    Ok(ShopMeta {
        path: data_dir,
        customer_count,
        delinquent_count,
        last_updated_on,
    })
}
