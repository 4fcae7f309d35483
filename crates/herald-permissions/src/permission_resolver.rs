use thiserror::Error;

use crate::permission_flags::Permissions;

/// Enumerates supported `PermissionError` values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),
}

/// Normalizes a permission name for table lookup (trimmed, upper-case).
pub fn normalize_permission_name(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Resolves a permission name case-insensitively against the static flag table.
///
/// Unknown and blank names are rejected, never mapped to an empty flag.
pub fn resolve_permission(name: &str) -> Result<Permissions, PermissionError> {
    let normalized = normalize_permission_name(name);
    if normalized.is_empty() {
        return Err(PermissionError::UnknownPermission(name.to_string()));
    }
    match Permissions::from_name(normalized.as_str()) {
        Some(flag) if !flag.is_empty() => Ok(flag),
        _ => Err(PermissionError::UnknownPermission(name.to_string())),
    }
}

/// Returns true when `mask` holds every bit of `flag`.
pub fn has_flag(mask: u64, flag: Permissions) -> bool {
    let required = flag.bits();
    mask & required == required
}

/// Resolves `permission_name` and checks it against `mask` with exact containment.
pub fn has_permission(mask: u64, permission_name: &str) -> Result<bool, PermissionError> {
    let flag = resolve_permission(permission_name)?;
    Ok(has_flag(mask, flag))
}

/// Returns true when `mask` fully contains at least one of `flags`.
pub fn has_any_permission<'a, I>(mask: u64, flags: I) -> bool
where
    I: IntoIterator<Item = &'a Permissions>,
{
    flags.into_iter().any(|flag| has_flag(mask, *flag))
}
