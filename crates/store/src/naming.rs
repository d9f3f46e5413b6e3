//! Filename sanitization and the stored-name scheme.
//!
//! A stored name is `"{label}__{sanitized}"` where `sanitized` is the final
//! path segment of the caller's filename with spaces replaced by `_`. The
//! result is a pure function of `(label, original)`, so uploading the same
//! label and filename twice overwrites the earlier file.
//!
//! Both `/` and `\` count as separators on every platform, so a Windows-style
//! path sent to a Unix host cannot smuggle a separator into the stored name.

/// Separator between the label and the sanitized filename.
pub const LABEL_SEPARATOR: &str = "__";

/// Longest stored name, in bytes, that common filesystems accept.
pub const MAX_STORED_NAME_BYTES: usize = 255;

/// Final path segment of `input`, treating `/` and `\` as separators.
///
/// `.` and `..` are returned as an empty string: they name directories, never
/// a file inside the content directory.
pub fn basename(input: &str) -> &str {
    let segment = input.rsplit(['/', '\\']).next().unwrap_or_default();
    match segment {
        "." | ".." => "",
        other => other,
    }
}

/// Whether `label` can prefix a stored name without affecting path resolution.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && label != "." && label != ".." && !label.contains(['/', '\\', '\0'])
}

/// Caller-visible original name: the basename, or `label` when that is empty.
pub fn original_name<'a>(label: &'a str, original: &'a str) -> &'a str {
    match basename(original) {
        "" => label,
        name => name,
    }
}

/// Sanitized filename component of a stored name.
pub fn sanitize_filename(label: &str, original: &str) -> String {
    original_name(label, original).replace(' ', "_")
}

/// Stored name for an upload. `label` is assumed to satisfy [`is_valid_label`].
pub fn stored_name(label: &str, original: &str) -> String {
    format!("{label}{LABEL_SEPARATOR}{}", sanitize_filename(label, original))
}

/// Whether `name` can be created as a single file in the content directory.
pub fn is_storable_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_STORED_NAME_BYTES && !name.contains('\0')
}
