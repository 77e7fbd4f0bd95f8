//! Curl command interpretation
//!
//! Design: the interpreter is a fold over the normalized word list. Each
//! step takes the pending [`ParserState`] and the descriptor built so far
//! and returns the next pair. Parsing is permissive: unknown flags, flags
//! without a value and malformed headers are skipped, never reported.

use crate::error::ParseError;
use crate::shell;
use crate::types::RequestDescriptor;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Command name a line must start with (followed by a space)
pub const COMMAND_NAME: &str = "curl";

/// Method flag that may be fused with its value (`-XPUT`)
const METHOD_FLAG: &str = "-X";

/// URL schemes recognized as the request target
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "file://"];

/// What the next plain value will be used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserState {
    /// No flag is waiting for a value
    #[default]
    None,
    /// `-H`, `--header`
    ExpectHeader,
    /// `-A`, `--user-agent`
    ExpectUserAgent,
    /// `-d`, `--data`, `--data-ascii`, `--data-binary`
    ExpectData,
    /// `-u`, `--user`
    ExpectUser,
    /// `-X`, `--request`
    ExpectMethod,
    /// `-b`, `--cookie`
    ExpectCookie,
}

/// Interpreter accumulator: pending state plus the descriptor so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpreter {
    state: ParserState,
    descriptor: RequestDescriptor,
}

impl Interpreter {
    /// Start with no pending state and a default descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Descriptor built so far
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Consume one word
    pub fn step(mut self, token: &str) -> Self {
        if is_url(token) {
            // URLs win over any pending flag; the pending state survives.
            self.descriptor.url = Some(token.to_string());
            return self;
        }

        match token {
            "-A" | "--user-agent" => self.state = ParserState::ExpectUserAgent,
            "-H" | "--header" => self.state = ParserState::ExpectHeader,
            "-d" | "--data" | "--data-ascii" | "--data-binary" => {
                self.state = ParserState::ExpectData
            }
            "-u" | "--user" => self.state = ParserState::ExpectUser,
            "-I" | "--head" => self.descriptor.method = "HEAD".to_string(),
            "-X" | "--request" => self.state = ParserState::ExpectMethod,
            "-b" | "--cookie" => self.state = ParserState::ExpectCookie,
            "--compressed" => self
                .descriptor
                .default_header("Accept-Encoding", "deflate, gzip"),
            "" => {}
            value => {
                apply_value(&mut self.descriptor, self.state, value);
                self.state = ParserState::None;
            }
        }

        self
    }

    /// Finish the walk; any pending state is dropped
    pub fn finish(self) -> RequestDescriptor {
        self.descriptor
    }
}

/// Apply a plain value to the descriptor according to `state`
fn apply_value(out: &mut RequestDescriptor, state: ParserState, value: &str) {
    match state {
        ParserState::ExpectHeader => {
            if let Some((name, field)) = parse_field(value) {
                out.headers.insert(name.to_string(), field.to_string());
            }
        }
        ParserState::ExpectUserAgent => {
            out.headers
                .insert("User-Agent".to_string(), value.to_string());
        }
        ParserState::ExpectData => {
            if out.method == "GET" || out.method == "HEAD" {
                out.method = "POST".to_string();
            }
            out.default_header("Content-Type", "application/x-www-form-urlencoded");
            out.body = Some(match out.body.take() {
                Some(body) if !body.is_empty() => format!("{body}&{value}"),
                _ => value.to_string(),
            });
        }
        ParserState::ExpectUser => {
            out.headers.insert(
                "Authorization".to_string(),
                format!("Basic {}", STANDARD.encode(credential_bytes(value))),
            );
        }
        ParserState::ExpectMethod => out.method = value.to_string(),
        ParserState::ExpectCookie => {
            out.headers.insert("Set-Cookie".to_string(), value.to_string());
        }
        ParserState::None => {}
    }
}

/// Split a header on the first `": "` followed by a value on the same line.
///
/// The value stops at the first line terminator and must be non-empty.
fn parse_field(s: &str) -> Option<(&str, &str)> {
    s.match_indices(": ").find_map(|(at, sep)| {
        let rest = &s[at + sep.len()..];
        let end = rest.find(is_line_terminator).unwrap_or(rest.len());
        (end > 0).then(|| (&s[..at], &rest[..end]))
    })
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Bytes to encode for Basic auth: Latin-1 when every char fits, else UTF-8
fn credential_bytes(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(u8::try_from)
        .collect::<Result<Vec<u8>, _>>()
        .unwrap_or_else(|_| value.as_bytes().to_vec())
}

/// Check if `s` looks like a URL
pub fn is_url(s: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| s.starts_with(scheme))
}

/// Split fused method flags: `-XPUT` becomes `-X`, `PUT`
pub fn normalize(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.strip_prefix(METHOD_FLAG) {
            Some(rest) if !rest.is_empty() => {
                out.push(METHOD_FLAG.to_string());
                out.push(rest.to_string());
            }
            _ => out.push(token),
        }
    }
    out
}

/// Walk normalized words (without the command name) into a descriptor
pub fn interpret<S: AsRef<str>>(tokens: &[S]) -> RequestDescriptor {
    tokens
        .iter()
        .fold(Interpreter::new(), |acc, token| acc.step(token.as_ref()))
        .finish()
}

/// Parse a full `curl ...` command line.
///
/// Returns `Ok(None)` when the line is not a curl command. Quoting errors
/// from word splitting are returned as is.
///
/// ```
/// let req = curlkit::parse_command("curl -XPUT https://example.com -d a=1")
///     .unwrap()
///     .unwrap();
/// assert_eq!(req.method, "PUT");
/// assert_eq!(req.body.as_deref(), Some("a=1"));
/// ```
pub fn parse_command(line: &str) -> Result<Option<RequestDescriptor>, ParseError> {
    let is_command = line
        .strip_prefix(COMMAND_NAME)
        .is_some_and(|rest| rest.starts_with(' '));
    if !is_command {
        return Ok(None);
    }

    let tokens = normalize(shell::split(line)?);
    let descriptor = interpret(tokens.get(1..).unwrap_or_default());

    tracing::debug!(
        url = descriptor.url.as_deref().unwrap_or(""),
        method = %descriptor.method,
        headers = descriptor.headers.len(),
        "Parsed curl command"
    );

    Ok(Some(descriptor))
}
