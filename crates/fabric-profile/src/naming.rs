//! Reserved attribute names, sentinels and file naming conventions

/// Attribute holding the whitespace separated list of parent profile ids.
pub const PARENTS: &str = "parents";

/// Sentinel value that removes a key; as a key it clears the whole file.
pub const DELETED: &str = "#deleted#";

/// Suffix of files that take part in per-key merging.
pub const PROPERTIES_SUFFIX: &str = ".properties";

/// Separator between a file name and the environment it applies to.
pub const ENVIRONMENT_SEPARATOR: char = '#';

/// Name of the variant of `file_name` that applies to `environment`.
///
/// ```
/// assert_eq!(
///     fabric_profile::environment_variant("db.properties", "prod"),
///     "db.properties#prod"
/// );
/// ```
pub fn environment_variant(file_name: &str, environment: &str) -> String {
    format!("{file_name}{ENVIRONMENT_SEPARATOR}{environment}")
}

/// Whether `file_name` is an environment specific variant.
pub fn is_environment_specific(file_name: &str) -> bool {
    file_name.contains(ENVIRONMENT_SEPARATOR)
}

/// Structured configuration section for a `.properties` file name.
///
/// Returns `None` for files that are merged wholesale.
pub fn section_name(file_name: &str) -> Option<&str> {
    if is_environment_specific(file_name) {
        return None;
    }
    file_name.strip_suffix(PROPERTIES_SUFFIX)
}
