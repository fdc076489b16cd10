pub mod commands;
pub mod models;

use commands::{
    customers::{add_customer, get_customers},
    db::delinquency_crud,
    settings::{get_settings, save_settings},
    shop::open_shop,
};
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            // The shop data directory must exist before the page opens it.
            let data_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&data_dir)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            open_shop,
            get_customers,
            add_customer,
            delinquency_crud,
            get_settings,
            save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
