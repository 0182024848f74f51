use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "placeholder_app",
    version,
    about = "Replace every image in a folder with a same-sized placeholder and pack them into a ZIP"
)]
pub struct Cli {
    /// Folders (or single files) to queue, in selection order
    #[arg(value_name = "FOLDER", required = true)]
    pub folders: Vec<PathBuf>,

    /// Directory the ZIP file is saved into (overrides the config file)
    #[arg(long, short, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// RON config file; defaults to ./placeholder.ron when present
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep an item's original bytes. Matches the full relative path or its trailing `/PATH` part
    #[arg(long = "skip", value_name = "PATH")]
    pub skip: Vec<String>,

    /// Flip the Skip All checkbox after loading
    #[arg(long)]
    pub skip_all: bool,

    /// Print the queue and exit without generating
    #[arg(long)]
    pub list: bool,

    /// Store entries without compression
    #[arg(long)]
    pub stored: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// True when `pattern` names `relative_path` exactly or as a trailing path segment run.
pub fn skip_matches(relative_path: &str, pattern: &str) -> bool {
    let pattern = pattern.replace('\\', "/");
    let pattern = pattern.trim_start_matches("./").trim_matches('/');
    if pattern.is_empty() {
        return false;
    }
    relative_path == pattern
        || relative_path
            .strip_suffix(pattern)
            .is_some_and(|head| head.ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_folders_and_flags() {
        let cli = Cli::try_parse_from([
            "placeholder_app",
            "photos",
            "more",
            "--skip",
            "logo.png",
            "--skip",
            "photos/a.jpg",
            "--stored",
            "--log",
            "both",
            "-o",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.folders, vec![PathBuf::from("photos"), PathBuf::from("more")]);
        assert_eq!(cli.skip, vec!["logo.png", "photos/a.jpg"]);
        assert!(cli.stored);
        assert!(!cli.skip_all);
        assert_eq!(cli.log, LogTarget::Both);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn requires_a_folder() {
        assert!(Cli::try_parse_from(["placeholder_app"]).is_err());
    }

    #[test]
    fn skip_matches_whole_segments_only() {
        assert!(skip_matches("photos/logo.png", "photos/logo.png"));
        assert!(skip_matches("photos/logo.png", "logo.png"));
        assert!(skip_matches("photos/sub/logo.png", "sub/logo.png"));
        assert!(skip_matches("photos/sub/logo.png", "./sub/logo.png"));
        assert!(skip_matches("photos/sub/logo.png", "sub\\logo.png"));
        assert!(!skip_matches("photos/biglogo.png", "logo.png"));
        assert!(!skip_matches("photos/logo.png", ""));
        assert!(!skip_matches("photos/logo.png", "photos"));
    }
}
