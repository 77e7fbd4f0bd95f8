//! curlkit CLI - run curl command lines and print the response as JSON

mod mcp;

use clap::{Parser, Subcommand};
use curlkit::{parse_command, Gateway, RequestDescriptor, TOOL_LLMTXT};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// curlkit - parse and execute curl command lines
#[derive(Parser, Debug)]
#[command(name = "curlkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp {
        #[command(flatten)]
        gateway: GatewayArgs,
    },
    /// Parse a curl command and print the request as JSON
    Parse {
        /// Full command line, e.g. "curl -X POST https://example.com -d a=1"
        line: String,
    },
    /// Execute a curl command and print the response as JSON
    Run {
        /// Full command line, e.g. "curl https://example.com"
        line: String,

        #[command(flatten)]
        gateway: GatewayArgs,
    },
}

/// Gateway settings shared by `run` and `mcp`
#[derive(clap::Args, Debug, Clone, Default)]
struct GatewayArgs {
    /// User-Agent used when the command sets none
    #[arg(long)]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Only allow URLs starting with this prefix (repeatable)
    #[arg(long)]
    allow_prefix: Vec<String>,

    /// Block URLs starting with this prefix (repeatable)
    #[arg(long)]
    block_prefix: Vec<String>,

    /// Allow requests to localhost, private and internal hosts
    #[arg(long)]
    allow_private: bool,
}

impl GatewayArgs {
    fn build(self) -> Gateway {
        let mut builder = Gateway::builder().block_private_hosts(!self.allow_private);

        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        for prefix in self.allow_prefix {
            builder = builder.allow_prefix(prefix);
        }
        for prefix in self.block_prefix {
            builder = builder.block_prefix(prefix);
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Mcp { gateway }) => {
            mcp::run_server(gateway.build()).await;
        }
        Some(Commands::Parse { line }) => run_parse(&line),
        Some(Commands::Run { line, gateway }) => {
            run_command(&line, gateway.build()).await;
        }
        None => {
            eprintln!("Usage: curlkit run \"curl <URL> [flags]\"");
            eprintln!("   or: curlkit parse \"curl <URL> [flags]\"");
            eprintln!("   or: curlkit mcp");
            eprintln!("   or: curlkit --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout stays clean for JSON and MCP traffic
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_parse(line: &str) {
    match parse_command(line) {
        Ok(Some(descriptor)) => writeln_safe(&format_descriptor(&descriptor)),
        Ok(None) => {
            eprintln!("Error: not a curl command");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_command(line: &str, gateway: Gateway) {
    match gateway.run(line).await {
        Ok(result) => {
            let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                eprintln!("Error serializing response: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a descriptor as pretty JSON
fn format_descriptor(descriptor: &RequestDescriptor) -> String {
    serde_json::to_string_pretty(descriptor).unwrap_or_default()
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_args() {
        let cli = Cli::parse_from(["curlkit", "parse", "curl -XPUT https://a"]);
        match cli.command {
            Some(Commands::Parse { line }) => assert_eq!(line, "curl -XPUT https://a"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_subcommand_args() {
        let cli = Cli::parse_from([
            "curlkit",
            "run",
            "curl https://a",
            "--timeout",
            "5",
            "--block-prefix",
            "https://a/admin",
            "--block-prefix",
            "https://a/internal",
            "--allow-private",
        ]);
        match cli.command {
            Some(Commands::Run { line, gateway }) => {
                assert_eq!(line, "curl https://a");
                assert_eq!(gateway.timeout, Some(5));
                assert_eq!(gateway.block_prefix.len(), 2);
                assert!(gateway.allow_private);

                let gateway = gateway.build();
                assert!(!gateway.filter().block_private_hosts);
                assert!(gateway.filter().is_allowed("http://localhost/"));
                assert!(!gateway.filter().is_allowed("https://a/admin/x"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_gateway_args_default_blocks_private() {
        let gateway = GatewayArgs::default().build();
        assert!(!gateway.filter().is_allowed("http://127.0.0.1/"));
    }

    #[test]
    fn test_format_descriptor() {
        let descriptor = parse_command("curl -u a:b https://example.com -d x=1")
            .unwrap()
            .unwrap();
        let output = format_descriptor(&descriptor);

        assert!(output.contains("\"url\": \"https://example.com\""));
        assert!(output.contains("\"method\": \"POST\""));
        assert!(output.contains("\"Authorization\": \"Basic YTpi\""));
        assert!(output.contains("\"body\": \"x=1\""));
    }
}
