//! curlkit - run curl command lines as structured HTTP requests
//!
//! This crate turns a textual `curl` invocation into a
//! [`RequestDescriptor`] and can execute it, relaying the response.
//!
//! ## Pipeline
//!
//! 1. [`shell::split`] splits the line into words with POSIX shell quoting.
//! 2. [`command::normalize`] separates fused flags such as `-XPUT`.
//! 3. [`command::interpret`] folds the words into a descriptor.
//!
//! [`parse_command`] runs all three. The [`Gateway`] adds URL filtering
//! ([`UrlFilter`]) and execution through an [`Executor`], by default the
//! reqwest-backed [`HttpExecutor`].
//!
//! Supported flags: `-A/--user-agent`, `-H/--header`,
//! `-d/--data/--data-ascii/--data-binary`, `-u/--user`, `-I/--head`,
//! `-X/--request`, `-b/--cookie`, `--compressed`. Anything else is ignored.

pub mod command;
mod error;
pub mod executor;
mod filter;
mod gateway;
pub mod shell;
mod types;

pub use command::{interpret, normalize, parse_command, ParserState};
pub use error::{ExecuteError, GatewayError, ParseError};
pub use executor::{ExecuteOptions, Executor, HttpExecutor};
pub use filter::UrlFilter;
pub use gateway::{Gateway, GatewayBuilder, GatewayResponse, DEFAULT_MAX_COMMAND_LEN};
pub use types::{CurlRequest, ExecutionResult, RequestDescriptor};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "curlkit/1.0";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Runs a curl command line and returns the HTTP response as JSON.

- Accepts a single `curl ...` command string
- Supports common flags: -X, -H, -d, -u, -A, -b, -I, --compressed
- Blocks requests to local and private network hosts
- JSON responses are returned parsed, everything else as text"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# curlkit Tool

Runs a curl command line and returns the HTTP response as JSON.

## Input Parameters
- `command` (required): the full command line, starting with `curl `

## Supported Flags
- `-X`, `--request <METHOD>`: request method (also fused, e.g. `-XPUT`)
- `-H`, `--header "Name: value"`: add a header (must contain `": "`)
- `-d`, `--data`, `--data-ascii`, `--data-binary <DATA>`: form body; repeated values are joined with `&`; switches GET/HEAD to POST
- `-u`, `--user <user:password>`: HTTP Basic authorization
- `-A`, `--user-agent <UA>`: User-Agent header
- `-b`, `--cookie <COOKIE>`: cookie header
- `-I`, `--head`: HEAD request
- `--compressed`: request deflate/gzip encoding

Other flags are ignored. Quoting follows POSIX shell rules.

## Output Fields
- `status`: HTTP status code
- `statusText`: reason phrase
- `headers`: response headers (lowercase names)
- `body`: parsed JSON for JSON responses, text otherwise

## Examples

### Simple GET
```json
{"command": "curl https://api.example.com/items"}
```

### POST form data with a header
```json
{"command": "curl -X POST https://api.example.com/items -H 'X-Token: abc' -d 'name=widget'"}
```

## Error Handling
- Lines not starting with `curl ` are rejected
- Unmatched quotes are rejected
- Missing URL, blocked URLs and transport failures return an error message
"#;
