//! Command-line interface of the runner binary.

use clap::Parser;
use neige_rpc::Endpoint;

/// Evaluates Lua snippets on behalf of the neige editor extension.
#[derive(Parser, Debug)]
#[command(name = "neige-runner", version)]
pub(crate) struct Cli {
    /// Host RPC endpoint: a socket path, `unix:///path`, `tcp://host:port`
    /// or `host:port`.
    #[arg(value_name = "ENDPOINT")]
    pub(crate) endpoint: Endpoint,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn parses_socket_path_endpoint() {
        let cli = Cli::try_parse_from(["neige-runner", "/tmp/nvim.sock"]).expect("parse");
        assert_eq!(cli.endpoint, Endpoint::unix("/tmp/nvim.sock"));
    }

    #[rstest]
    fn parses_tcp_endpoint() {
        let cli = Cli::try_parse_from(["neige-runner", "127.0.0.1:6666"]).expect("parse");
        assert_eq!(cli.endpoint, Endpoint::tcp("127.0.0.1", 6666));
    }

    #[rstest]
    #[case::missing(&["neige-runner"])]
    #[case::extra(&["neige-runner", "/tmp/a", "/tmp/b"])]
    #[case::empty(&["neige-runner", ""])]
    #[case::unknown_flag(&["neige-runner", "--config", "x", "/tmp/a"])]
    fn rejects_invalid_invocations(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
