//! Case inspection command implementation.

use crate::cli::{CasesAction, CasesArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use faris_domain::CaseId;
use faris_store::SqliteCaseStore;
use std::path::PathBuf;

/// Resolve the database path from the flag or the config file.
pub fn database_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.database.clone()).ok_or_else(|| {
        CliError::Config("No case database: pass --db or set 'database' in the config file".into())
    })
}

/// Execute the cases command.
pub fn execute_cases(args: CasesArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let path = database_path(args.db, config)?;
    if !path.exists() {
        return Err(CliError::NotFound(format!("database {}", path.display())));
    }
    let store = SqliteCaseStore::new(&path)?;

    let output = match args.action {
        CasesAction::List { limit } => formatter.format_cases(&store.list_recent(limit)?)?,
        CasesAction::Show { case_id } => {
            let id: CaseId = case_id.parse().map_err(CliError::InvalidInput)?;
            let result = store.get(id)?.ok_or(CliError::NotFound(case_id))?;
            formatter.format_result(&result)?
        }
        CasesAction::Stats => formatter.format_stats(&store.stats()?)?,
    };
    println!("{}", output);
    Ok(())
}
