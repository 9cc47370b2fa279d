//! Identifier normalization for URL path segments.
//!
//! `user-profile` becomes `userProfile`, `INDEX` becomes `index`. The
//! function is total: empty input and stray hyphens are fine.

/// Convert a raw path segment into a controller/action identifier.
///
/// A segment without hyphens is lower-cased in full. A hyphenated segment
/// is camelCase-joined: the first part is lower-cased, every following
/// part has only its first character upper-cased and the rest kept as is.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if !raw.contains('-') {
        return raw.to_lowercase();
    }

    let mut out = String::with_capacity(raw.len());
    for (idx, part) in raw.split('-').enumerate() {
        if idx == 0 {
            out.push_str(&part.to_lowercase());
        } else {
            out.push_str(&ucfirst(part));
        }
    }
    out
}

/// Upper-case the first character, leave the rest untouched.
#[must_use]
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_segments() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("foo"), "foo");
        assert_eq!(normalize("FoO"), "foo");
    }

    #[test]
    fn test_normalize_hyphenated_segments() {
        assert_eq!(normalize("foo-bar"), "fooBar");
        assert_eq!(normalize("foo-bar-baz"), "fooBarBaz");
        assert_eq!(normalize("FOO-bar"), "fooBar");
        // only the first character of later parts is touched
        assert_eq!(normalize("foo-BAR"), "fooBAR");
    }

    #[test]
    fn test_normalize_empty_parts() {
        assert_eq!(normalize("-foo"), "Foo");
        assert_eq!(normalize("foo-"), "foo");
        assert_eq!(normalize("foo--bar"), "fooBar");
        assert_eq!(normalize("-"), "");
    }

    #[test]
    fn test_ucfirst() {
        assert_eq!(ucfirst("userProfile"), "UserProfile");
        assert_eq!(ucfirst(""), "");
        assert_eq!(ucfirst("élan"), "Élan");
    }
}
