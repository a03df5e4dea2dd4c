/// Prefixes that only denote a variant of the same site.
const VARIANT_PREFIXES: [&str; 2] = ["www.", "m."];

/// Turns a hostname into the key every ledger map is indexed by. Lowercases the host and strips
/// the `www.`/`m.` variant prefix, so `www.GitHub.com` and `m.github.com` both end up as
/// `github.com`.
///
/// Stripping is repeated until no variant prefix is left, which keeps the function idempotent
/// even for odd hosts like `www.m.example.com`.
pub fn normalize(hostname: &str) -> String {
    let mut normalized = hostname.trim().to_lowercase();
    while let Some(stripped) = VARIANT_PREFIXES
        .iter()
        .find_map(|prefix| normalized.strip_prefix(prefix))
    {
        normalized = stripped.trim_start().to_string();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_www_and_lowercases() {
        assert_eq!(normalize("www.GitHub.com"), "github.com");
        assert_eq!(normalize("GITHUB.COM"), "github.com");
    }

    #[test]
    fn strips_mobile_prefix() {
        assert_eq!(normalize("m.youtube.com"), "youtube.com");
    }

    #[test]
    fn keeps_other_subdomains() {
        assert_eq!(normalize("docs.rs"), "docs.rs");
        assert_eq!(normalize("mail.google.com"), "mail.google.com");
        assert_eq!(normalize("mwww.example.com"), "mwww.example.com");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn stacked_prefixes_collapse_in_one_call() {
        let once = normalize("www.m.Example.com");
        assert_eq!(once, "example.com");
        assert_eq!(normalize(&once), once);
        assert_eq!(normalize("www.www.example.com"), "example.com");
    }
}
