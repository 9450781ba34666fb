use anyhow::{Result, anyhow};

/// Trims, strips the trailing root dot, converts IDNs to ASCII and lowercases.
pub fn normalize_domain(input: &str) -> Result<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(anyhow!("domain name is required"));
    }
    let ascii = idna::domain_to_ascii(trimmed)
        .map_err(|err| anyhow!("invalid domain name: {err}"))?;
    Ok(ascii.to_lowercase())
}

pub fn normalize_domains(domains: &[String]) -> Result<Vec<String>> {
    domains.iter().map(|domain| normalize_domain(domain)).collect()
}

/// Returns the registrable root of `hostname`: the ICANN public suffix plus one label.
///
/// `www.example.com` yields `example.com`, `api.example.co.uk` yields
/// `example.co.uk`. Private-section suffixes are ignored, so
/// `www.myapp.github.io` yields `github.io`. A bare public suffix such as
/// `com` has no root.
pub fn registrable_root(hostname: &str) -> Result<String> {
    let normalized = normalize_domain(hostname)?;
    let no_root = || anyhow!("{normalized} has no registrable domain");

    let suffix_len = icann_suffix_len(&normalized).ok_or_else(no_root)?;
    if suffix_len >= normalized.len() {
        return Err(no_root());
    }
    let (prefix, suffix) = normalized.split_at(normalized.len() - suffix_len);
    let label = prefix
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
        .ok_or_else(no_root)?;
    Ok(format!("{label}.{suffix}"))
}

/// Length of the longest ICANN suffix of `name`, skipping private-section entries.
fn icann_suffix_len(name: &str) -> Option<usize> {
    let mut candidate = name;
    loop {
        let suffix = psl::suffix(candidate.as_bytes())?;
        if !matches!(suffix.typ(), Some(psl::Type::Private)) {
            return Some(suffix.as_bytes().len());
        }
        candidate = std::str::from_utf8(suffix.as_bytes())
            .ok()?
            .split_once('.')?
            .1;
    }
}

/// Zone names are compared fully qualified, so `example.com` becomes `example.com.`.
pub fn fully_qualified(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.').to_ascii_lowercase();
    format!("{trimmed}.")
}
