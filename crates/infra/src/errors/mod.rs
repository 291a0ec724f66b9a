//! Infrastructure error plumbing.

mod conversions;

pub use conversions::InfraError;
use skysync_domain::SkySyncError;

/// Convert any error with an [`InfraError`] mapping straight into the domain
/// error, for use in `map_err`.
pub(crate) fn to_domain<E>(err: E) -> SkySyncError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}
