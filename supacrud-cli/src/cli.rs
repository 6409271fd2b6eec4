//! Command-line arguments

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use supacrud::OperationKind;

/// Generate Supabase CRUD data-access modules from your database types
#[derive(Debug, Parser)]
#[command(name = "supacrud")]
#[command(version)]
#[command(about = "Generate Supabase CRUD modules from generated database types", long_about = None)]
pub struct Cli {
    /// Table to generate modules for (repeat for several tables)
    #[arg(short = 't', long = "table", value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Generate every operation (create, read, update, delete, list)
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Generate the create operation
    #[arg(short = 'c', long)]
    pub create: bool,

    /// Generate the read operation
    #[arg(short = 'r', long)]
    pub read: bool,

    /// Generate the update operation
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Generate the delete operation
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Generate the list operation
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Replace the stored Supabase credentials
    #[arg(short = 's', long = "set-creds")]
    pub set_creds: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Operations selected by flags
    ///
    /// `--all` wins over individual flags. Individual flags come back in
    /// create, read, update, delete, list order.
    #[must_use]
    pub fn operations(&self) -> Vec<OperationKind> {
        if self.all {
            return vec![OperationKind::All];
        }
        let flags = [self.create, self.read, self.update, self.delete, self.list];
        OperationKind::COMPOSITE_ORDER
            .into_iter()
            .zip(flags)
            .filter_map(|(kind, selected)| selected.then_some(kind))
            .collect()
    }

    /// Whether anything besides credential rotation was requested
    #[must_use]
    pub fn requests_generation(&self) -> bool {
        !self.tables.is_empty() || !self.operations().is_empty() || !self.set_creds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["supacrud", "-t", "users", "-t", "posts", "-l", "-c"]).unwrap();
        assert_eq!(cli.tables, vec!["users", "posts"]);
        assert_eq!(
            cli.operations(),
            vec![OperationKind::Create, OperationKind::List]
        );
        assert!(cli.requests_generation());
    }

    #[test]
    fn test_all_wins() {
        let cli = Cli::try_parse_from(["supacrud", "-a", "-r"]).unwrap();
        assert_eq!(cli.operations(), vec![OperationKind::All]);
    }

    #[test]
    fn test_set_creds_alone() {
        let cli = Cli::try_parse_from(["supacrud", "--set-creds"]).unwrap();
        assert!(cli.set_creds);
        assert!(!cli.requests_generation());

        let cli = Cli::try_parse_from(["supacrud"]).unwrap();
        assert!(cli.requests_generation());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["supacrud", "-vv", "--project-root", "app"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.project_root, Some(PathBuf::from("app")));
    }
}
