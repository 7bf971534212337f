use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("required field empty: {field}")]
    EmptyField { field: &'static str },

    #[error("no parseable price token on item")]
    PriceParse,

    #[error("image fetch failed for {url}: {source}")]
    ImageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} fetching {url}")]
    ImageStatus { status: u16, url: String },

    #[error("image store I/O error: {0}")]
    ImageStore(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] modfeed_db::DbError),
}
