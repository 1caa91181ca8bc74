use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("tenant not found")]
    TenantNotFound,

    #[error("tenant login domain already exists")]
    DomainConflict,

    #[error("not found")]
    NotFound,

    #[error("invalid or unknown token")]
    TokenUnknown,

    #[error("token expired")]
    TokenExpired { token_id: String, tenant_id: String },

    #[error("registration already resolved")]
    AlreadyResolved,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

pub type Result<T> = std::result::Result<T, Error>;
