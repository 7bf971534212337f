use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("import record {0} not found")]
    RecordMissing(i64),

    #[error("vendor {0} not found for record")]
    VendorMissing(i64),

    #[error("invalid alias pattern for key {key}: {source}")]
    AliasPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Db(#[from] modfeed_db::DbError),
}

impl ParseError {
    /// A skippable error is logged and the job completed rather than
    /// retried: redelivery would hit the same condition again (missing
    /// record, missing vendor, a stored layer that no longer decodes).
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        match self {
            ParseError::RecordMissing(_) | ParseError::VendorMissing(_) => true,
            ParseError::Db(modfeed_db::DbError::Sqlx(sqlx::Error::ColumnDecode { .. })) => true,
            _ => false,
        }
    }
}
