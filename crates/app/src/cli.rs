use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, default_value = "api")]
    pub mode: Mode,
    /// Open the index at startup, creating it when missing.
    #[arg(long, default_value_t = false)]
    pub force_creation: bool,
    /// Lifetime of tokens printed by `--mode issue-token`.
    #[arg(long, default_value_t = 3600)]
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Api,
    Status,
    IssueToken,
}

impl Mode {
    pub fn run_api(self) -> bool {
        matches!(self, Mode::Api)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Mode};
    use clap::Parser;

    #[test]
    fn defaults_to_api_mode() {
        let cli = Cli::try_parse_from(["mksearch"]).unwrap();
        assert_eq!(cli.mode, Mode::Api);
        assert!(!cli.force_creation);
        assert_eq!(cli.token_ttl_secs, 3600);
    }

    #[test]
    fn parses_kebab_case_modes() {
        let cli = Cli::try_parse_from(["mksearch", "--mode", "issue-token", "--token-ttl-secs", "60"])
            .unwrap();
        assert_eq!(cli.mode, Mode::IssueToken);
        assert_eq!(cli.token_ttl_secs, 60);
        let cli = Cli::try_parse_from(["mksearch", "--mode", "status", "--force-creation"]).unwrap();
        assert_eq!(cli.mode, Mode::Status);
        assert!(cli.force_creation);
    }
}
