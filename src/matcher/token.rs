/// Whole-token, case-insensitive containment with hyphen folding.
///
/// The haystack is searched in two spellings at once: hyphens dropped
/// ("eos-1d" -> "eos1d") and hyphens as spaces ("eos-1d" -> "eos 1d").
/// Hyphens are dropped from the needle. Only the first occurrence is
/// looked at, and it counts when neither neighbouring character is
/// alphanumeric, so "pro" is found in "super pro" but not in "superpro" or
/// "superpro pro". An empty needle always matches.
pub fn contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.to_lowercase().replace('-', "");
    if needle.is_empty() {
        return true;
    }

    let haystack = haystack.to_lowercase();
    let searchable = format!("{} {}", haystack.replace('-', ""), haystack.replace('-', " "));

    match searchable.find(&needle) {
        Some(start) => is_whole_token(&searchable, start, needle.len()),
        None => false,
    }
}

fn is_whole_token(text: &str, start: usize, len: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[start + len..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
