use thiserror::Error;

/// Whole-call failures raised by the fetcher and the price store.
///
/// Row-level feed problems never show up here: the parser drops bad rows.
#[derive(Error, Debug)]
pub enum Error {
    /// Feed URL is empty or not an absolute request URI. Never retried.
    #[error("invalid feed url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Network, DNS or HTTP failure while retrieving the feed.
    #[error("feed transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Bulk upsert or query failure in the persistence layer.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Transport(err.into())
    }

    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Storage(err.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_message_names_the_url() {
        let err = Error::InvalidUrl {
            url: "yandex.ru/price".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };

        assert_eq!(
            err.to_string(),
            "invalid feed url \"yandex.ru/price\": relative URL without a base"
        );
    }

    #[test]
    fn test_storage_from_rusqlite() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().starts_with("storage error:"));
    }
}
