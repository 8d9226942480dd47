use crate::model::Stats;
use monoda::personal::{AccountId, Token};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("FS Error")]
    Fs(#[from] std::io::Error),

    #[error("RON Error")]
    Ron(#[from] ron::de::SpannedError),

    #[error("Roster has no members")]
    Empty,

    #[error("Duplicate account `{0}` in roster")]
    DuplicateAccount(AccountId),

    #[error("Roster member with account `{0}` has an empty name")]
    EmptyName(AccountId),
}

/// One family member's fetch credentials.
///
/// The `Debug` representation redacts the token, so roster members are safe to log.
#[derive(Clone, Debug, Deserialize)]
pub struct UserConfig {
    /// Display name used to tag this member's transactions.
    pub name: String,

    /// Monobank account to fetch.
    pub account: AccountId,

    /// Personal API token for the account.
    pub token: Token,
}

/// Read the family roster from a RON file.
///
/// A roster is a sequence of [`UserConfig`] entries. It must contain at least one member, names
/// must be non-empty, and no account may appear twice.
pub fn read_roster(s: &mut Stats, path: impl AsRef<Path>) -> Result<Vec<UserConfig>, RosterError> {
    let file = BufReader::new(File::open(path)?);

    debug!("Parsing roster members");
    let roster: Vec<UserConfig> = ron::de::from_reader(file)?;

    if roster.is_empty() {
        return Err(RosterError::Empty);
    }

    let mut seen = HashSet::new();
    for member in &roster {
        debug!("Deserialized: {member:?}");

        if member.name.is_empty() {
            return Err(RosterError::EmptyName(member.account.clone()));
        }
        if !seen.insert(member.account.clone()) {
            return Err(RosterError::DuplicateAccount(member.account.clone()));
        }
        s.inc_members();
    }

    Ok(roster)
}
