//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use linefetch_core::session::DEFAULT_IDLE_TIMEOUT_SECS;
use linefetch_core::transport::DEFAULT_CONNECT_TIMEOUT_SECS;
use linefetch_core::Terminator;

/// Default server port.
pub const DEFAULT_PORT: u16 = 51511;

/// Line-based TCP client that streams announced file downloads to disk.
///
/// Connects to HOST:PORT, sends each line typed on stdin as a request, and
/// prints every response line. `GET /path/file.ext` requests answered with
/// `HTTP/1.1 200 OK` and a `Content-Length` header are saved to a file.
#[derive(Parser, Debug, Clone)]
#[command(name = "linefetch")]
#[command(author, version, about)]
pub struct Args {
    /// Server host name or IP address
    #[arg(default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory to save downloaded files in (default: current directory)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// TCP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Abort a download after this many seconds without data (1-3600)
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub idle_timeout: u64,

    /// Terminator appended to each request line: none, crlf, double-crlf
    #[arg(short = 't', long, default_value_t = Terminator::None, value_parser = parse_terminator)]
    pub terminator: Terminator,

    /// Keep partially downloaded files when a download aborts
    #[arg(long)]
    pub keep_partial: bool,

    /// Print progress as plain lines instead of a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_terminator(value: &str) -> Result<Terminator, String> {
    value.parse()
}
