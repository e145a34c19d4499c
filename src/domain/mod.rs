// Domain layer - metric catalog, periods and series models
pub mod error;
pub mod insight;
pub mod metric;
pub mod period;
pub mod series;
