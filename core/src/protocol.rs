//! Line codec for the key-value store protocol.
//!
//! # Design
//! Commands and replies are plain data. `Command::encode` produces the bytes
//! to write and `Reply::parse` consumes one line read back; the caller owns
//! the socket. Keeping the codec free of I/O lets the server's `TcpStore`
//! and the test vectors share one definition of the wire format.
//!
//! Every command is a single line terminated by `\r\n`:
//!
//! ```text
//! GET <key>
//! SET <key> <value>[ -&save]
//! DEL <key>[ -&save]
//! LIN <user> <password>
//! AUTH <token>
//! ```
//!
//! Every reply is a single line: empty, `nil` or `null` for an absent key,
//! `OK` for an acknowledgement, `ERR <message>` for a failure, and anything
//! else is a value.

use std::fmt;

use crate::error::KvError;

/// Flag appended to mutating commands to request a durable write.
pub const SAVE_FLAG: &str = "-&save";

/// A single command for the store.
#[derive(Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Get {
        key: &'a str,
    },
    Set {
        key: &'a str,
        value: &'a str,
        durable: bool,
    },
    Del {
        key: &'a str,
        durable: bool,
    },
    Login {
        user: &'a str,
        password: &'a str,
    },
    Auth {
        token: &'a str,
    },
}

impl Command<'_> {
    /// Protocol verb, also used as the log label for the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Login { .. } => "LIN",
            Command::Auth { .. } => "AUTH",
        }
    }

    /// Render the command as a `\r\n`-terminated line.
    pub fn encode(&self) -> Result<String, KvError> {
        let mut line = String::from(self.name());
        match self {
            Command::Get { key } => {
                push_word(&mut line, key)?;
            }
            Command::Set {
                key,
                value,
                durable,
            } => {
                push_word(&mut line, key)?;
                if value.contains(['\r', '\n']) {
                    return Err(KvError::InvalidValue((*key).to_string()));
                }
                line.push(' ');
                line.push_str(value);
                push_save_flag(&mut line, *durable);
            }
            Command::Del { key, durable } => {
                push_word(&mut line, key)?;
                push_save_flag(&mut line, *durable);
            }
            Command::Login { user, password } => {
                push_word(&mut line, user)?;
                push_word(&mut line, password)?;
            }
            Command::Auth { token } => {
                push_word(&mut line, token)?;
            }
        }
        line.push_str("\r\n");
        Ok(line)
    }
}

// Credentials must never reach the logs.
impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get { key } => f.debug_struct("Get").field("key", key).finish(),
            Command::Set { key, durable, .. } => f
                .debug_struct("Set")
                .field("key", key)
                .field("durable", durable)
                .finish_non_exhaustive(),
            Command::Del { key, durable } => f
                .debug_struct("Del")
                .field("key", key)
                .field("durable", durable)
                .finish(),
            Command::Login { user, .. } => f
                .debug_struct("Login")
                .field("user", user)
                .field("password", &"[REDACTED]")
                .finish(),
            Command::Auth { .. } => f
                .debug_struct("Auth")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Check that `word` can be sent as one space-delimited token.
pub fn validate_word(word: &str) -> Result<(), KvError> {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(KvError::InvalidKey(word.to_string()));
    }
    Ok(())
}

fn push_word(line: &mut String, word: &str) -> Result<(), KvError> {
    validate_word(word)?;
    line.push(' ');
    line.push_str(word);
    Ok(())
}

fn push_save_flag(line: &mut String, durable: bool) {
    if durable {
        line.push(' ');
        line.push_str(SAVE_FLAG);
    }
}

/// One reply line from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Nil,
    Value(String),
    Error(String),
}

impl Reply {
    /// Classify a reply line. Trailing `\r\n` or `\n` is ignored.
    pub fn parse(line: &str) -> Reply {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "nil" || trimmed == "null" {
            return Reply::Nil;
        }
        if trimmed == "OK" {
            return Reply::Ok;
        }
        if let Some(message) = error_message(trimmed) {
            return Reply::Error(message.to_string());
        }
        Reply::Value(line.to_string())
    }

    /// Interpret the reply to a `GET`.
    pub fn into_value(self) -> Result<Option<String>, KvError> {
        match self {
            Reply::Value(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
            Reply::Error(message) => Err(KvError::Server(message)),
            Reply::Ok => Err(KvError::UnexpectedReply("OK".to_string())),
        }
    }

    /// Interpret the reply to a mutating or handshake command.
    pub fn into_ack(self) -> Result<(), KvError> {
        match self {
            Reply::Error(message) => Err(KvError::Server(message)),
            Reply::Ok | Reply::Nil | Reply::Value(_) => Ok(()),
        }
    }
}

fn error_message(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("ERROR")
        .or_else(|| line.strip_prefix("ERR"))?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix([' ', ':']).map(str::trim)
}
