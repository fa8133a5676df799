/// Characters rejected in file names by at least one supported platform
const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Remove every character that cannot appear in a file name.
///
/// Characters are deleted, not replaced, and the remaining ones keep their order.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|&c| !(c.is_control() || ILLEGAL_CHARS.contains(&c)))
        .collect()
}
