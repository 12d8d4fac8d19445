//! Path handling shared by the router and the providers.
//!
//! Scene descriptions name mesh files with either separator, sometimes with
//! a leading slash or `./` noise. Every path is reduced to one canonical
//! relative form before it reaches a provider, so a provider root can never
//! be escaped by the path alone.

use crate::VfsError;

/// Characters accepted as separators in incoming paths.
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Meaningful segments of `path`, skipping empty and `.` segments.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATORS)
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

/// `C:` or `C:rest`, which would re-root a joined path on Windows.
fn has_drive_prefix(segment: &str) -> bool {
    matches!(segment.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic())
}

fn invalid(path: &str, reason: &str) -> VfsError {
    VfsError::InvalidPath(format!("\"{path}\" {reason}"))
}

/// Reduce `path` to canonical form: relative, `/`-separated, without empty
/// or `.` segments.
///
/// # Errors
///
/// [`VfsError::InvalidPath`] if the path names nothing, climbs with `..`,
/// starts with a drive prefix such as `C:`, or contains a NUL byte.
pub fn normalize(path: &str) -> Result<String, VfsError> {
    if path.contains('\0') {
        return Err(invalid(path, "contains a NUL byte"));
    }

    let mut canonical = String::with_capacity(path.len());
    for (i, segment) in segments(path).enumerate() {
        if segment == ".." {
            return Err(invalid(path, "climbs above its root"));
        }
        if i == 0 && has_drive_prefix(segment) {
            return Err(invalid(path, "starts with a drive prefix"));
        }
        if !canonical.is_empty() {
            canonical.push('/');
        }
        canonical.push_str(segment);
    }

    if canonical.is_empty() {
        return Err(invalid(path, "names no file"));
    }
    Ok(canonical)
}

/// Last segment of `path` in either separator convention.
///
/// Used to name meshes after the file they came from, so
/// `scenes\cbox\cbox.serialized` and `scenes/cbox/cbox.serialized` both
/// yield `cbox.serialized`. Returns `path` itself if it has no segments.
pub fn file_name(path: &str) -> &str {
    path.rsplit(SEPARATORS)
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

/// Split a canonical path into the mount name and the path inside it.
pub(crate) fn split_source(canonical: &str) -> (&str, &str) {
    canonical.split_once('/').unwrap_or((canonical, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("meshes/cbox.serialized", "meshes/cbox.serialized")]
    #[case::windows("meshes\\cbox\\cbox.serialized", "meshes/cbox/cbox.serialized")]
    #[case::mixed("scene\\meshes/bunny.serialized", "scene/meshes/bunny.serialized")]
    #[case::absolute_style("/scene/bunny.serialized", "scene/bunny.serialized")]
    #[case::unc_style("\\\\scene\\bunny.serialized", "scene/bunny.serialized")]
    #[case::dot_noise("./scene/./meshes//bunny.serialized/", "scene/meshes/bunny.serialized")]
    #[case::colon_later("scene/part:1.serialized", "scene/part:1.serialized")]
    fn canonical_form(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::separators_only("/\\/")]
    #[case::dots_only("./.")]
    #[case::parent("meshes/../../etc/passwd")]
    #[case::windows_parent("meshes\\..\\secret.serialized")]
    #[case::drive("C:\\scenes\\cbox.serialized")]
    #[case::drive_relative("d:cbox.serialized")]
    #[case::nul("cbox\0.serialized")]
    fn rejected(#[case] raw: &str) {
        assert!(matches!(normalize(raw), Err(VfsError::InvalidPath(_))));
    }

    #[test]
    fn rejection_names_the_path() {
        let Err(VfsError::InvalidPath(reason)) = normalize("a/../b") else {
            panic!("expected InvalidPath");
        };
        assert!(reason.contains("a/../b"), "{reason}");
    }

    #[rstest]
    #[case::unix("scenes/cbox/cbox.serialized", "cbox.serialized")]
    #[case::windows("scenes\\cbox\\cbox.serialized", "cbox.serialized")]
    #[case::bare("cbox.serialized", "cbox.serialized")]
    #[case::trailing_separator("scenes/cbox/", "cbox")]
    #[case::nothing("", "")]
    fn file_name_of(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(file_name(raw), expected);
    }

    #[test]
    fn mount_and_rest() {
        assert_eq!(
            split_source("scene/meshes/bunny.serialized"),
            ("scene", "meshes/bunny.serialized")
        );
        assert_eq!(split_source("bunny.serialized"), ("bunny.serialized", ""));
    }
}
