use thiserror::Error;

#[derive(Error, Debug)]
pub enum KollectorError {
    #[error("Not authenticated: no current user to scope the remote fetch")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid collectible: {0}")]
    InvalidCollectible(String),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of [`KollectorError`] for callers that present
/// failures to users and don't care about the underlying source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotAuthenticated,
    StoreIo,
    RemoteFetch,
    Decoding,
    Config,
}

impl KollectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KollectorError::NotAuthenticated => ErrorKind::NotAuthenticated,
            KollectorError::Io(_)
            | KollectorError::Serialization(_)
            | KollectorError::Database(_)
            | KollectorError::Store(_)
            | KollectorError::InvalidCollectible(_) => ErrorKind::StoreIo,
            KollectorError::RemoteFetch(_) => ErrorKind::RemoteFetch,
            KollectorError::Decoding(_) => ErrorKind::Decoding,
            KollectorError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<confique::Error> for KollectorError {
    fn from(err: confique::Error) -> Self {
        KollectorError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_store_failures() {
        let io = KollectorError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::StoreIo);
        assert_eq!(
            KollectorError::Store("poisoned".to_string()).kind(),
            ErrorKind::StoreIo
        );
        assert_eq!(
            KollectorError::InvalidCollectible("empty id".to_string()).kind(),
            ErrorKind::StoreIo
        );
    }

    #[test]
    fn test_kind_keeps_remote_and_decoding_apart() {
        assert_eq!(
            KollectorError::RemoteFetch("503".to_string()).kind(),
            ErrorKind::RemoteFetch
        );
        assert_eq!(
            KollectorError::Decoding("bad json".to_string()).kind(),
            ErrorKind::Decoding
        );
        assert_eq!(
            KollectorError::NotAuthenticated.kind(),
            ErrorKind::NotAuthenticated
        );
    }
}
