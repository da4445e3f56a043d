//! Line-oriented script language for driving a store.
//!
//! ```text
//! # comment
//! t1 = begin
//! insert t1 1 100
//! commit t1
//! t2 = begin
//! read t2 1
//! write 2 1 200        # raw timestamps work too
//! show 1
//! ```

use mvtokv::{Key, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' expects {expected} argument(s), got {got}")]
    WrongArity {
        line: usize,
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: '{token}' is not a number")]
    BadNumber { line: usize, token: String },

    #[error("line {line}: invalid transaction name '{name}'")]
    BadName { line: usize, name: String },

    #[error("line {line}: unknown transaction '{name}'")]
    UnknownTransaction { line: usize, name: String },
}

/// A transaction as written in a script: a bound name or a raw timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnRef {
    Name(String),
    Timestamp(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Begin { bind: Option<String> },
    Insert { txn: TxnRef, key: Key, value: Value },
    Read { txn: TxnRef, key: Key },
    Write { txn: TxnRef, key: Key, value: Value },
    Commit { txn: TxnRef },
    Rollback { txn: TxnRef },
    Show { key: Key },
    Txn { txn: TxnRef },
    Active,
    Stats,
}

/// Parse one line. Blank lines and comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Command>, ScriptError> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    // `name = begin`
    if args.first() == Some(&"=") {
        if args.len() != 2 || !args[1].eq_ignore_ascii_case("begin") {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: line.trim().to_string(),
            });
        }
        return Ok(Some(Command::Begin {
            bind: Some(binding_name(line_no, head)?),
        }));
    }

    let command = head.to_ascii_lowercase();
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(ScriptError::WrongArity {
                line: line_no,
                command: command.clone(),
                expected,
                got: args.len(),
            })
        }
    };

    let parsed = match command.as_str() {
        "begin" => {
            arity(0)?;
            Command::Begin { bind: None }
        }
        "insert" => {
            arity(3)?;
            Command::Insert {
                txn: txn_ref(line_no, args[0])?,
                key: number(line_no, args[1])?,
                value: number(line_no, args[2])?,
            }
        }
        "read" => {
            arity(2)?;
            Command::Read {
                txn: txn_ref(line_no, args[0])?,
                key: number(line_no, args[1])?,
            }
        }
        "write" => {
            arity(3)?;
            Command::Write {
                txn: txn_ref(line_no, args[0])?,
                key: number(line_no, args[1])?,
                value: number(line_no, args[2])?,
            }
        }
        "commit" => {
            arity(1)?;
            Command::Commit {
                txn: txn_ref(line_no, args[0])?,
            }
        }
        "rollback" => {
            arity(1)?;
            Command::Rollback {
                txn: txn_ref(line_no, args[0])?,
            }
        }
        "show" => {
            arity(1)?;
            Command::Show {
                key: number(line_no, args[0])?,
            }
        }
        "txn" => {
            arity(1)?;
            Command::Txn {
                txn: txn_ref(line_no, args[0])?,
            }
        }
        "active" => {
            arity(0)?;
            Command::Active
        }
        "stats" => {
            arity(0)?;
            Command::Stats
        }
        _ => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: command.clone(),
            });
        }
    };
    Ok(Some(parsed))
}

fn number(line_no: usize, token: &str) -> Result<i64, ScriptError> {
    token.parse().map_err(|_| ScriptError::BadNumber {
        line: line_no,
        token: token.to_string(),
    })
}

/// `7` and `txn_7` are timestamps, anything else is a name
fn txn_ref(line_no: usize, token: &str) -> Result<TxnRef, ScriptError> {
    let digits = token.strip_prefix("txn_").unwrap_or(token);
    if let Ok(ts) = digits.parse::<u64>() {
        return Ok(TxnRef::Timestamp(ts));
    }
    Ok(TxnRef::Name(binding_name(line_no, token)?))
}

fn binding_name(line_no: usize, token: &str) -> Result<String, ScriptError> {
    let valid = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !token.starts_with("txn_");

    if valid {
        Ok(token.to_string())
    } else {
        Err(ScriptError::BadName {
            line: line_no,
            name: token.to_string(),
        })
    }
}
