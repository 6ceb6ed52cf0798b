//! Slug generation
//!
//! Turns free text into a URL-safe token: lowercase ASCII letters and
//! digits separated by single hyphens. Pure function, no I/O; uniqueness
//! against stored records is the caller's concern.

/// Token used when the input contains no sluggable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// Generate a URL-friendly slug from free text.
///
/// Lowercases ASCII alphanumerics, folds non-ASCII letters to their ASCII
/// lowercase form where one exists, and collapses every other run of
/// characters into a single hyphen. Leading and trailing hyphens are
/// stripped. Input with nothing sluggable in it (including the empty
/// string) yields [`FALLBACK_SLUG`], so the result is never empty.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    // Starts true so leading separators are swallowed.
    let mut prev_hyphen = true;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if c.is_alphanumeric() {
            let mut folded = false;
            for lc in c.to_lowercase() {
                if lc.is_ascii_alphanumeric() {
                    slug.push(lc);
                    folded = true;
                }
            }
            if folded {
                prev_hyphen = false;
            } else if !prev_hyphen {
                slug.push('-');
                prev_hyphen = true;
            }
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("What's New?"), "what-s-new");
    }

    #[test]
    fn test_slugify_collapses_separator_runs() {
        assert_eq!(slugify("Hello   --  World"), "hello-world");
        assert_eq!(slugify("a___b"), "a-b");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  Hello World  "), "hello-world");
        assert_eq!(slugify("--hello--"), "hello");
    }

    #[test]
    fn test_slugify_mixed_case_and_digits() {
        assert_eq!(slugify("Release 2.0 Notes"), "release-2-0-notes");
    }

    #[test]
    fn test_slugify_unsluggable_input_falls_back() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify("   "), FALLBACK_SLUG);
        assert_eq!(slugify("技术文章"), FALLBACK_SLUG);
    }

    #[test]
    fn test_slugify_keeps_ascii_part_of_mixed_input() {
        assert_eq!(slugify("Tech 技术"), "tech");
    }

    proptest! {
        #[test]
        fn prop_slugify_never_empty(input in ".*") {
            prop_assert!(!slugify(&input).is_empty());
        }

        #[test]
        fn prop_slugify_is_url_safe(input in ".*") {
            let slug = slugify(&input);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn prop_slugify_has_clean_hyphens(input in ".*") {
            let slug = slugify(&input);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_slugify_is_idempotent(input in ".*") {
            let once = slugify(&input);
            prop_assert_eq!(slugify(&once), once.clone());
        }
    }
}
