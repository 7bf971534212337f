//! Compiled alias matchers for gender, color, and pattern resolution.
//!
//! Alias groups are loaded from the database once per worker start and
//! compiled into whole-word, case-insensitive regexes. Match order is the
//! table's `(priority, id)` order, so when two canonical keys' patterns
//! could both match the same text, curation decides the winner via
//! `priority` rather than incidental iteration order. An explicit
//! [`AliasSet::reload`] path exists so long-lived workers can pick up
//! curation changes without a restart.

use modfeed_db::{AliasGroupRow, AliasKind};
use regex::Regex;
use sqlx::PgPool;

use crate::error::ParseError;

/// One compiled alias table: canonical keys with their matchers, in match
/// order.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

#[derive(Debug, Clone)]
struct AliasEntry {
    canonical_key: String,
    pattern: Regex,
}

impl AliasTable {
    /// Compiles `(canonical_key, aliases)` pairs, preserving their order.
    /// Groups with no aliases are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AliasPattern`] if a pattern fails to compile
    /// (only possible with pathological alias strings, since every alias is
    /// escaped).
    pub fn compile<I, S>(groups: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        for (key, aliases) in groups {
            let key = key.into();
            if aliases.is_empty() {
                continue;
            }
            let alternation = aliases
                .iter()
                .map(|a| regex::escape(a))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).map_err(|e| {
                ParseError::AliasPattern {
                    key: key.clone(),
                    source: e,
                }
            })?;
            entries.push(AliasEntry {
                canonical_key: key,
                pattern,
            });
        }
        Ok(Self { entries })
    }

    /// Compiles database rows, which arrive already ordered by
    /// `(priority, id)`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AliasPattern`] on a failed compile.
    pub fn from_rows(rows: &[AliasGroupRow]) -> Result<Self, ParseError> {
        Self::compile(
            rows.iter()
                .map(|r| (r.canonical_key.clone(), r.aliases.clone())),
        )
    }

    /// First canonical key whose pattern matches `text`.
    #[must_use]
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.pattern.is_match(text))
            .map(|e| e.canonical_key.as_str())
    }

    /// Every canonical key whose pattern matches `text`, in table order.
    #[must_use]
    pub fn all_matches(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.pattern.is_match(text))
            .map(|e| e.canonical_key.clone())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three alias tables a parse worker needs.
#[derive(Debug, Clone)]
pub struct AliasSet {
    pub gender: AliasTable,
    pub color: AliasTable,
    pub pattern: AliasTable,
}

impl AliasSet {
    /// Loads and compiles all alias groups from the database.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Db`] on a query failure or
    /// [`ParseError::AliasPattern`] on a failed compile.
    pub async fn load(pool: &PgPool) -> Result<Self, ParseError> {
        let gender = modfeed_db::list_alias_groups(pool, AliasKind::Gender).await?;
        let color = modfeed_db::list_alias_groups(pool, AliasKind::Color).await?;
        let pattern = modfeed_db::list_alias_groups(pool, AliasKind::Pattern).await?;
        Ok(Self {
            gender: AliasTable::from_rows(&gender)?,
            color: AliasTable::from_rows(&color)?,
            pattern: AliasTable::from_rows(&pattern)?,
        })
    }

    /// Re-reads the tables, replacing the compiled matchers in place.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AliasSet::load`]; on error the existing
    /// matchers are left untouched.
    pub async fn reload(&mut self, pool: &PgPool) -> Result<(), ParseError> {
        *self = Self::load(pool).await?;
        Ok(())
    }
}
