use crate::config::Config;
use crate::resolve::TieBreak;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "godev-oracle",
    version,
    about = "Path-translating proxy between the godev IDE and the Go oracle tool",
    after_help = r#"Examples:
  godev-oracle --godev                       (run as a CGI program)
  godev-oracle roots
  godev-oracle request --path /go/oracle/implements/file/example.com/app/main.go --query 'pos=120'
  godev-oracle --tie-break last request --path /go/oracle/callers/file/GOROOT/fmt/print.go --query 'pos=4410&scope=fmt'
"#
)]
pub struct Args {
    /// Serve one CGI request described by the environment.
    #[arg(long)]
    pub godev: bool,
    /// Oracle executable (overrides GODEV_ORACLE_BIN).
    #[arg(long, global = true)]
    pub oracle_bin: Option<String>,
    /// Seconds to wait for oracle before killing it (overrides GODEV_ORACLE_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Root precedence for physical-to-logical mapping (overrides GODEV_ORACLE_TIE_BREAK).
    #[arg(long, global = true, value_enum)]
    pub tie_break: Option<TieBreak>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(bin) = &self.oracle_bin {
            config.oracle_bin = bin.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(tie_break) = self.tie_break {
            config.tie_break = tie_break;
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a single request and print the CGI-formatted response.
    Request {
        /// Request path, e.g. /go/oracle/referrers/file/<logical path>.
        #[arg(long)]
        path: String,
        /// Url-encoded query string (pos=...&scope=...).
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "GET")]
        method: String,
    },
    /// Print the discovered source roots as JSON.
    Roots,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_env() {
        let args = Args::parse_from([
            "godev-oracle",
            "--oracle-bin",
            "/tmp/oracle",
            "--timeout-secs",
            "0",
            "--tie-break",
            "last",
            "roots",
        ]);
        let config = args.config();
        assert_eq!(config.oracle_bin, "/tmp/oracle");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.tie_break, TieBreak::LastMatch);
        assert!(matches!(args.command, Some(Command::Roots)));
    }

    #[test]
    fn godev_flag_without_subcommand() {
        let args = Args::parse_from(["godev-oracle", "--godev"]);
        assert!(args.godev);
        assert!(args.command.is_none());
    }
}
