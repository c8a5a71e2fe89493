//! Validation for decoded path addresses.

use crate::types::{PathAddress, PathSegment};
use crate::PathError;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate an address decoded from untrusted input.
///
/// # Errors
///
/// - the address is deeper than [`MAX_PATH_LENGTH`] segments
/// - a keyed selector carries an empty id
///
/// # Example
///
/// ```
/// use docpatch_path::{validate_path, PathAddress};
///
/// validate_path(&PathAddress::root().key("a").keyed("k")).unwrap();
/// validate_path(&PathAddress::root().keyed("")).unwrap_err();
/// ```
pub fn validate_path(path: &PathAddress) -> Result<(), PathError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PathError::PathTooLong);
    }
    if path
        .segments()
        .iter()
        .any(|s| matches!(s, PathSegment::Keyed(id) if id.is_empty()))
    {
        return Err(PathError::InvalidPath("empty keyed selector".to_string()));
    }
    Ok(())
}
