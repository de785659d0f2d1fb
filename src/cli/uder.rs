use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::importer::tax_records;
use crate::logging;
use crate::settings::{load_settings, Job};
use crate::sink::{LogSink, TracingSink};
use crate::tax_check::TaxCheck;

use super::config_path;

pub fn run(config: Option<String>, input: Option<String>) -> Result<i32> {
    let loaded = load_settings(&config_path(config, Job::Uder), Job::Uder)?;
    let mut settings = loaded.settings;
    if let Some(input) = input {
        settings.input_file = input;
    }
    logging::init(&settings)?;
    let mut log = TracingSink;

    if !loaded.found {
        log.warn(&format!(
            "Settings file {} not found. Using defaults.",
            loaded.path.display()
        ));
    }

    let mut check = TaxCheck::new(settings.tax_codes.clone(), &settings.last_month, TracingSink);
    if !loaded.found {
        check.mark_failed();
    }

    let checked = settings
        .encoding()
        .and_then(|encoding| tax_records(&settings.input_path(), encoding))
        .and_then(|records| check.start(records).map(|residuals| residuals.to_vec()));
    let residuals = match checked {
        Ok(residuals) => residuals,
        Err(e) => {
            log.critical(&e.to_string());
            return Err(e);
        }
    };

    if residuals.is_empty() {
        println!("{}", "All tax withholdings balance.".green());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Tab number", "Month", "Difference"]);
        for r in &residuals {
            table.add_row(vec![
                Cell::new(&r.tabn),
                Cell::new(&r.month),
                Cell::new(&r.amount),
            ]);
        }
        println!("Tax differences\n{table}");
    }
    Ok(check.return_code())
}
