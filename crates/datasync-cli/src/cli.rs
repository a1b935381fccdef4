use std::path::PathBuf;

use clap::Parser;
use datasync_core::EntityKind;

#[derive(Debug, Parser)]
#[command(name = "datasync")]
#[command(about = "Propagate proposals, sessions, persons and samples into ISPyB")]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "conf", env = "DATASYNC_CONFIG", value_name = "FILE")]
    pub conf: PathBuf,

    /// Append log output to this file instead of stdout
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Only reconcile session participants for sessions that ended within
    /// this many days (overrides sync.session_person_min_age_days)
    #[arg(long = "gt", value_name = "DAYS")]
    pub gt: Option<u32>,

    /// Run only the named pass; repeat to run several, in the given order
    /// (overrides sync.passes)
    #[arg(long = "pass", value_name = "KIND")]
    pub passes: Vec<EntityKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["datasync", "-c", "/etc/datasync.toml", "-l", "/tmp/ds.log"])
            .unwrap();
        assert_eq!(cli.conf, PathBuf::from("/etc/datasync.toml"));
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/ds.log")));
        assert!(cli.passes.is_empty());
        assert_eq!(cli.gt, None);
    }

    #[test]
    fn test_repeated_passes_keep_order() {
        let cli = Cli::try_parse_from([
            "datasync",
            "--conf",
            "a.toml",
            "--gt",
            "7",
            "--pass",
            "session_has_person",
            "--pass",
            "proposals",
        ])
        .unwrap();
        assert_eq!(cli.gt, Some(7));
        assert_eq!(
            cli.passes,
            vec![EntityKind::SessionHasPerson, EntityKind::Proposals]
        );
    }

    #[test]
    fn test_unknown_pass_is_rejected() {
        assert!(Cli::try_parse_from(["datasync", "-c", "a.toml", "--pass", "shipments"]).is_err());
    }
}
