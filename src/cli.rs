use clap::{Parser, Subcommand};
use labor_registry::importers::{catottg, employers, job_titles, kp, kved, speciality};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "labor-registry", version, about = "Job-market reference data and registry service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,
    /// Load the CATOTTG administrative codifier
    LoadCatottg {
        #[arg(long, default_value = catottg::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Load the KVED classification of economic activities
    LoadKved {
        #[arg(long, default_value = kved::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Load the KP classification of occupations
    LoadKp {
        #[arg(long, default_value = kp::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Load detailed job titles and attach them to KP nodes
    LoadJobTitles {
        #[arg(long, default_value = job_titles::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Load knowledge fields and specialities
    LoadSpeciality {
        #[arg(long, default_value = speciality::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Seed employment types, education levels, degrees, tags and sources
    LoadDictionaries,
    /// Import employers from a CSV export
    ImportEmployers {
        file: PathBuf,
        /// Email of the user who will own imported employers
        #[arg(long, default_value = employers::DEFAULT_OWNER_EMAIL)]
        owner: String,
    },
    /// Import vacancies from a CSV export
    ImportVacancies { file: PathBuf },
    /// Deactivate active vacancies older than the configured age
    CleanupVacancies,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn loaders_default_to_temp_files() {
        let cli = Cli::parse_from(["labor-registry", "load-kp"]);
        match cli.command {
            Command::LoadKp { file } => assert_eq!(file, PathBuf::from(kp::DEFAULT_FILE)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn employer_import_takes_owner_override() {
        let cli = Cli::parse_from([
            "labor-registry",
            "import-employers",
            "employers.csv",
            "--owner",
            "hr@example.com",
        ]);
        match cli.command {
            Command::ImportEmployers { file, owner } => {
                assert_eq!(file, PathBuf::from("employers.csv"));
                assert_eq!(owner, "hr@example.com");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
