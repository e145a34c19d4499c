// Errors surfaced by the history engine
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// A batch could not be loaded; which metric failed is only in the source chain
    #[error("failed to load historical data")]
    Fetch {
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid view: {0}")]
    InvalidView(String),
}

impl HistoryError {
    pub fn fetch(source: anyhow::Error) -> Self {
        HistoryError::Fetch { source }
    }

    /// True for errors caused by the caller's selection rather than the data source
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, HistoryError::Fetch { .. })
    }
}
