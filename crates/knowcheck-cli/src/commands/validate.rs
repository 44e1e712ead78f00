//! The `knowcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let loaded = knowcheck_core::parser::load_banks_checked(&bank_path)?;
    let banks = loaded.banks;
    anyhow::ensure!(
        !banks.is_empty() || !loaded.failures.is_empty(),
        "no question banks found in {}",
        bank_path.display()
    );

    let mut total_warnings = 0;

    for bank in &banks {
        println!(
            "Bank: {} ({} questions, {} categories)",
            bank.name,
            bank.len(),
            bank.categories().len()
        );

        let warnings = knowcheck_core::parser::validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [q{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    for failure in &loaded.failures {
        println!("  ERROR: {}: {:#}", failure.path.display(), failure.error);
    }

    anyhow::ensure!(
        loaded.failures.is_empty(),
        "{} bank file(s) failed to load",
        loaded.failures.len()
    );

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
