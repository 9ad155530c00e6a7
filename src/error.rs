/// Errors returned by keyed lookups that must produce a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No element in the tree compares equal to the requested key.
    #[error("key not found in tree")]
    KeyNotFound,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
