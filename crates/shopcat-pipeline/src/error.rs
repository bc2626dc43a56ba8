use shopcat_db::DbError;
use shopcat_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store rejected one operation; the connection is still usable.
    #[error("document store error: {0}")]
    Store(#[source] DbError),

    /// The connection to the store is gone; further writes will fail too.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("sink task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DbError> for SinkError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(ref source) if is_connection_loss(source) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Store(other),
        }
    }
}

fn is_connection_loss(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store is unreachable: {0}")]
    Connectivity(#[source] ScraperError),

    #[error("fetch failed before any product was retrieved: {0}")]
    Fetch(#[source] ScraperError),

    #[error("persisting products failed: {0}")]
    Sink(#[from] SinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_connections_are_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        for err in [
            sqlx::Error::Io(io),
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
        ] {
            let sink_err = SinkError::from(DbError::Sqlx(err));
            assert!(matches!(sink_err, SinkError::Unavailable(_)), "got: {sink_err:?}");
        }
    }

    #[test]
    fn rejected_statements_stay_store_errors() {
        let err = SinkError::from(DbError::Sqlx(sqlx::Error::Protocol(
            "unsupported Unicode escape sequence".to_owned(),
        )));
        assert!(matches!(err, SinkError::Store(DbError::Sqlx(_))));

        let err = SinkError::from(DbError::MissingDatabaseUrl);
        assert!(matches!(err, SinkError::Store(DbError::MissingDatabaseUrl)));
    }
}
