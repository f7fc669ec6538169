use crate::error::{AppError, Result};

/// Derives a URL-safe slug: lowercase ASCII alphanumerics separated by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Normalizes a manual slug. Input without any letters or digits is rejected.
fn explicit_slug(explicit: Option<&str>) -> Result<Option<String>> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let slug = slugify(raw);
            if slug.is_empty() {
                return Err(AppError::Validation(
                    "Slug must contain letters or digits".to_string(),
                ));
            }
            Ok(Some(slug))
        }
        None => Ok(None),
    }
}

/// Slug to store on create: an explicit non-empty slug wins over the derived one.
pub fn resolve(title: &str, explicit: Option<&str>) -> Result<String> {
    Ok(explicit_slug(explicit)?.unwrap_or_else(|| slugify(title)))
}

/// Slug after an update. A slug that still matches the old title follows title changes.
pub fn follow_title(
    old_title: &str,
    old_slug: &str,
    new_title: &str,
    explicit: Option<&str>,
) -> Result<String> {
    if let Some(slug) = explicit_slug(explicit)? {
        return Ok(slug);
    }
    if old_slug.is_empty() || old_slug == slugify(old_title) {
        Ok(slugify(new_title))
    } else {
        Ok(old_slug.to_string())
    }
}
