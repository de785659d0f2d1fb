use std::io::BufRead;

use colored::Colorize;

use crate::codes::CodeMap;
use crate::error::Result;
use crate::importer::{payment_records, write_statements};
use crate::logging;
use crate::reconciler::Reconciler;
use crate::settings::{load_settings, Job};
use crate::sink::{LogSink, TracingSink};

use super::config_path;

fn checklist(codes: &CodeMap) -> Vec<String> {
    let primary = codes.primary_codes().join(", ");
    vec![
        " 1. Open Galaktika.".to_string(),
        " 2. Check two settings: return tax (Yes), control withholding (No).".to_string(),
        " 3. Recalculate averages:".to_string(),
        "      Payroll | Settings | Service functions | Recalculate averages".to_string(),
        " 4. Run the pre-posting:".to_string(),
        "      Payroll | Operations | Payroll calculation | Pre-posting".to_string(),
        " 5. Run uchrabvr_select.bat to export UCHRABVR.txt.".to_string(),
        " 6. Press Enter here and wait for the run to finish.".to_string(),
        " 7. Review the log file.".to_string(),
        " 8. Run uchrabvr_update.bat.".to_string(),
        format!(" 9. Set algorithm 2 for payment codes {primary}:"),
        "      Payroll | Settings | Catalogs | Payment and discount types".to_string(),
        "10. Calculate payroll WITHOUT the 'Pre-posting' option.".to_string(),
        "11. Restore the previous algorithms afterwards.".to_string(),
    ]
}

/// Show the operator checklist and keep a copy of it in the log file.
fn print_checklist(codes: &CodeMap, log: &mut impl LogSink) {
    println!("{}", "Before running:".bold());
    log.info("Before running:");
    for line in checklist(codes) {
        println!("{line}");
        log.info(&line);
    }
}

fn wait_for_enter() -> Result<()> {
    println!("Press Enter to continue...");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

pub fn run(
    config: Option<String>,
    input: Option<String>,
    output: Option<String>,
    yes: bool,
) -> Result<i32> {
    let loaded = load_settings(&config_path(config, Job::Uchrabvr), Job::Uchrabvr)?;
    let mut settings = loaded.settings;
    if let Some(input) = input {
        settings.input_file = input;
    }
    if let Some(output) = output {
        settings.output_file_path = output;
    }
    logging::init(&settings)?;
    let mut log = TracingSink;

    if !loaded.found {
        log.warn(&format!(
            "Settings file {} not found. Using defaults.",
            loaded.path.display()
        ));
    }

    let prepared = settings
        .encoding()
        .and_then(|encoding| settings.code_map().map(|codes| (encoding, codes)));
    let (encoding, codes) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            log.critical(&format!("{e}. Cannot continue"));
            return Err(e);
        }
    };

    print_checklist(&codes, &mut log);
    if !yes {
        wait_for_enter()?;
    }

    let mut reconciler = Reconciler::new(codes, &settings.table_name, TracingSink);
    if !loaded.found {
        reconciler.mark_failed();
    }

    let input_path = settings.input_path();
    log.info(&format!("Reading {}", input_path.display()));
    let processed = payment_records(&input_path, encoding).and_then(|records| reconciler.start(records));
    if let Err(e) = processed {
        log.critical(&e.to_string());
        return Err(e);
    }
    reconciler.finish();

    let output_path = settings.output_path();
    if let Err(e) = write_statements(&output_path, reconciler.output(), encoding) {
        log.critical(&e.to_string());
        return Err(e);
    }

    println!(
        "{} employee groups, {} statements written to {}",
        reconciler.groups(),
        reconciler.output().len(),
        output_path.display()
    );
    if !reconciler.unprocessed_codes().is_empty() {
        let codes: Vec<&str> = reconciler.unprocessed_codes().iter().map(String::as_str).collect();
        println!("{} {}", "Unprocessed payment codes:".yellow(), codes.join(", "));
    }
    let code = reconciler.return_code();
    if code == 0 {
        println!("{}", "Done without errors.".green());
    } else {
        log.critical("Errors were recorded during the run. See the log file for details.");
        println!(
            "{}",
            format!("Errors were recorded. See {}", settings.log_path().display()).red()
        );
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_names_sorted_primary_codes() {
        let lines = checklist(&CodeMap::builtin());
        assert_eq!(lines.len(), 14);
        assert_eq!(
            lines[10],
            " 9. Set algorithm 2 for payment codes 18, 20, 48, 54, 76, 77, 87, 104, 106, 107, 108, 109, 110, 111, 112, 204:"
        );
    }
}
