use thiserror::Error;
use veil_traits::StorageError;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Indicates that an error in the finite-field arithmetic was encountered.
    #[error("{0}")]
    MathError(veil_util::Error),

    /// Indicates that a storage backend failed.
    #[error("{0}")]
    StorageError(StorageError),

    /// Indicates a threshold that violates `2 <= threshold <= shares`.
    #[error("Invalid threshold {threshold} for {shares} shares")]
    InvalidThreshold {
        /// The requested threshold.
        threshold: usize,
        /// The requested number of shares.
        shares: usize,
    },

    /// Indicates a share that cannot be parsed or is inconsistent with its peers.
    #[error("Malformed share: {0}")]
    MalformedShare(String),

    /// Indicates that too few shares were supplied for reconstruction.
    #[error("Insufficient shares: {0} provided, {1} required")]
    InsufficientShares(usize, usize),

    /// Indicates that ciphertexts or keys from different keypairs were combined.
    #[error("Incompatible keys: values were produced under different public keys")]
    IncompatibleKeys,

    /// Indicates a plaintext outside of the encodable range of the public key.
    #[error("Plaintext is outside of the encodable range")]
    PlaintextOutOfRange,

    /// Indicates that an upload failed on some backends.
    ///
    /// `uploaded` holds the locators obtained before the failure was
    /// reported, indexed by backend position; cleaning them up is the
    /// caller's responsibility.
    #[error("Replication failed on {} of {} backends", failures.len(), total)]
    ReplicationPartialFailure {
        /// Locators of the successful uploads, by backend index.
        uploaded: Vec<(usize, String)>,
        /// Errors of the failed uploads, by backend index.
        failures: Vec<(usize, StorageError)>,
        /// Number of backends the upload was issued to.
        total: usize,
    },

    /// Indicates a serialization error.
    #[error("Serialization error")]
    SerializationError,

    /// Indicates that an input is invalid.
    #[error("{0}")]
    UnspecifiedInput(String),
}

impl From<veil_util::Error> for Error {
    fn from(e: veil_util::Error) -> Self {
        Error::MathError(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::StorageError(e)
    }
}

/// Helper functions to create errors with a consistent message.
impl Error {
    /// Create an invalid threshold error.
    pub fn invalid_threshold(threshold: usize, shares: usize) -> Self {
        Self::InvalidThreshold { threshold, shares }
    }

    /// Create a malformed share error.
    pub fn malformed_share<S: Into<String>>(msg: S) -> Self {
        Self::MalformedShare(msg.into())
    }

    /// Create an insufficient shares error.
    pub fn insufficient_shares(provided: usize, required: usize) -> Self {
        Self::InsufficientShares(provided, required)
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::UnspecifiedInput(format!("Invalid parameter: {}", msg.into()))
    }
}
