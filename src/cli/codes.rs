use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::{load_settings, Job};

use super::config_path;

pub fn list(config: Option<String>) -> Result<i32> {
    let loaded = load_settings(&config_path(config, Job::Uchrabvr), Job::Uchrabvr)?;
    let codes = loaded.settings.code_map()?;

    let mut table = Table::new();
    table.set_header(vec!["Primary", "Secondary"]);
    for mapping in codes.mappings() {
        table.add_row(vec![
            Cell::new(mapping.primary.iter().collect::<Vec<_>>().join(", ")),
            Cell::new(mapping.secondary.iter().collect::<Vec<_>>().join(", ")),
        ]);
    }
    let source = if loaded.settings.codes.is_some() {
        loaded.path.display().to_string()
    } else {
        "built-in".to_string()
    };
    println!("Code table ({source})\n{table}");
    Ok(0)
}
