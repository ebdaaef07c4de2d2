/// Failure taxonomy for the public service operations.
///
/// Optional-upstream (air quality) failures never appear here; they degrade to
/// absent AQI fields on the returned reading instead.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Empty or whitespace-only city parameter.
    #[error("City name must not be empty")]
    InvalidCity,

    /// The city could not be geocoded, or has no stored history.
    #[error("No data available for city '{0}'")]
    NotFound(String),

    /// The required weather upstream failed or returned malformed data.
    #[error("Weather upstream request failed")]
    Upstream(#[source] anyhow::Error),

    /// History store or export I/O failure.
    #[error("History store failure")]
    Store(#[source] anyhow::Error),
}
