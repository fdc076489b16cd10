use crate::commands::db::{get_db_connection, insert_customer, list_customers};
use crate::models::customer::Customer;

#[tauri::command]
pub async fn get_customers(data_dir: String) -> Result<Vec<Customer>, String> {
    let conn = get_db_connection(&data_dir).map_err(|e| format!("DB error: {e}"))?;

    list_customers(&conn).map_err(|e| format!("Query error: {e}"))
}

#[tauri::command]
pub async fn add_customer(data_dir: String, name: String, phone: String) -> Result<Customer, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("NAME_REQUIRED: Customer name must not be empty".to_string());
    }

    let conn = get_db_connection(&data_dir).map_err(|e| format!("DB error: {e}"))?;

    insert_customer(&conn, name, phone.trim()).map_err(|e| format!("Insert error: {e}"))
}
