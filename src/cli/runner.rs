use super::script::{Command, ScriptError, TxnRef, parse_line};
use anyhow::{Result, bail};
use mvtokv::{CommitStatus, DbError, MvtoStore, TransactionId};
use std::collections::HashMap;
use std::io::Write;
use tracing::{Level, event};

/// Executes parsed script commands against one store
pub struct Runner {
    store: MvtoStore,
    names: HashMap<String, TransactionId>,
    fail_fast: bool,
}

impl Runner {
    pub fn new(store: MvtoStore, fail_fast: bool) -> Self {
        Self {
            store,
            names: HashMap::new(),
            fail_fast,
        }
    }

    pub fn store(&self) -> &MvtoStore {
        &self.store
    }

    /// Run every line of `source`, writing one output line per command.
    ///
    /// Protocol errors are reported inline and do not stop the script unless
    /// fail-fast is on. Malformed lines always stop it.
    pub fn run_script(&mut self, source: &str, out: &mut impl Write) -> Result<()> {
        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let Some(command) = parse_line(line_no, line)? else {
                continue;
            };

            match self.execute(line_no, &command)? {
                Ok(output) => writeln!(out, "{output}")?,
                Err(err) => {
                    writeln!(out, "error: {err}")?;
                    if self.fail_fast {
                        bail!("line {line_no}: {err}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Outer error: the script itself is wrong. Inner error: the store
    /// refused the operation.
    pub fn execute(
        &mut self,
        line_no: usize,
        command: &Command,
    ) -> std::result::Result<std::result::Result<String, DbError>, ScriptError> {
        event!(Level::DEBUG, line = line_no, ?command, "execute");

        let outcome = match command {
            Command::Begin { bind } => self.store.begin().map(|txn| match bind {
                Some(name) => {
                    self.names.insert(name.clone(), txn);
                    format!("{name} = {txn}")
                }
                None => format!("{txn}"),
            }),
            Command::Insert { txn, key, value } => {
                let txn = self.resolve(line_no, txn)?;
                self.store
                    .insert(txn, *key, *value)
                    .map(|()| format!("{txn} inserted {key} = {value}"))
            }
            Command::Read { txn, key } => {
                let txn = self.resolve(line_no, txn)?;
                self.store
                    .read(txn, *key)
                    .map(|value| format!("{txn} read {key} = {value}"))
            }
            Command::Write { txn, key, value } => {
                let txn = self.resolve(line_no, txn)?;
                self.store
                    .write(txn, *key, *value)
                    .map(|()| format!("{txn} wrote {key} = {value}"))
            }
            Command::Commit { txn } => {
                let txn = self.resolve(line_no, txn)?;
                self.store.commit(txn).map(|status| match status {
                    CommitStatus::Committed => format!("{txn} committed"),
                    CommitStatus::Deferred => format!("{txn} commit deferred"),
                })
            }
            Command::Rollback { txn } => {
                let txn = self.resolve(line_no, txn)?;
                let report = self.store.rollback(txn);
                Ok(if report.is_noop() {
                    format!("{txn} not active")
                } else if report.cascaded().is_empty() {
                    format!("{txn} rolled back")
                } else {
                    format!("{txn} rolled back, cascaded: {}", join_ids(report.cascaded()))
                })
            }
            Command::Show { key } => Ok(match self.store.versions(*key) {
                Some(versions) => serde_json::to_string(&versions)
                    .unwrap_or_else(|err| format!("<unprintable: {err}>")),
                None => format!("{key} does not exist"),
            }),
            Command::Txn { txn } => {
                let txn = self.resolve(line_no, txn)?;
                Ok(match self.store.transaction_info(txn) {
                    Some(info) => format!(
                        "{} {} wait={} commit_requested={} written={} reads={}",
                        info.id,
                        info.state,
                        info.wait_count,
                        info.commit_requested,
                        info.written,
                        info.reads
                    ),
                    None => format!("{txn} not active"),
                })
            }
            Command::Active => Ok(format!(
                "active: [{}]",
                join_ids(&self.store.active_transactions())
            )),
            Command::Stats => Ok(serde_json::to_string(&self.store.stats())
                .unwrap_or_else(|err| format!("<unprintable: {err}>"))),
        };
        Ok(outcome)
    }

    fn resolve(
        &self,
        line_no: usize,
        txn: &TxnRef,
    ) -> std::result::Result<TransactionId, ScriptError> {
        match txn {
            TxnRef::Timestamp(ts) => Ok(TransactionId(*ts)),
            TxnRef::Name(name) => self.names.get(name).copied().ok_or_else(|| {
                ScriptError::UnknownTransaction {
                    line: line_no,
                    name: name.clone(),
                }
            }),
        }
    }
}

fn join_ids(ids: &[TransactionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
