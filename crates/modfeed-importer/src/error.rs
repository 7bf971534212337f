use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import record {0} not found")]
    RecordMissing(i64),

    #[error("vendor {0} not found for record")]
    VendorMissing(i64),

    #[error("record {0} has no final layer to import")]
    FinalLayerMissing(i64),

    #[error("final layer of record {record_id} is missing {field}")]
    FinalLayerIncomplete {
        record_id: i64,
        field: &'static str,
    },

    #[error(transparent)]
    Db(#[from] modfeed_db::DbError),
}

impl ImportError {
    /// Skippable errors complete the job instead of retrying: the same
    /// condition would greet every redelivery. A reparse (not a retry) is
    /// what fixes an incomplete final layer.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        match self {
            ImportError::RecordMissing(_)
            | ImportError::VendorMissing(_)
            | ImportError::FinalLayerMissing(_)
            | ImportError::FinalLayerIncomplete { .. } => true,
            ImportError::Db(modfeed_db::DbError::Sqlx(sqlx::Error::ColumnDecode { .. })) => true,
            ImportError::Db(_) => false,
        }
    }
}
