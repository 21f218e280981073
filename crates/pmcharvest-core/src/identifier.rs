use url::Url;

/// Derive the resource identifier from an article URL: the last segment of
/// its path after trailing slashes are stripped.
///
/// Strings that do not parse as absolute URLs are treated as a bare path
/// (query and fragment dropped). The segment is taken from the input as
/// written, without percent-encoding or other normalization. Never fails;
/// the result is empty when the path is empty.
pub fn extract_identifier(url: &str) -> String {
    raw_path(url.trim())
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Path component of `input`, sliced from the original text.
fn raw_path(input: &str) -> &str {
    let input = bare_path(input);
    if Url::parse(input).is_err() {
        return input;
    }
    let rest = input.split_once(':').map_or(input, |(_, rest)| rest);
    match rest.strip_prefix("//") {
        Some(authority) => authority.find('/').map_or("", |i| &authority[i..]),
        None => rest,
    }
}

fn bare_path(input: &str) -> &str {
    let end = input.find(['?', '#']).unwrap_or(input.len());
    &input[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_last_segment() {
        assert_eq!(
            extract_identifier("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC7096724"),
            "PMC7096724"
        );
    }

    #[test]
    fn strips_trailing_slash() {
        assert_eq!(extract_identifier("https://x/y/articles/PMC12345/"), "PMC12345");
        assert_eq!(extract_identifier("https://x/y/articles/PMC12345///"), "PMC12345");
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            extract_identifier("https://pmc.ncbi.nlm.nih.gov/articles/PMC42/?report=reader#sec1"),
            "PMC42"
        );
    }

    #[test]
    fn empty_path_yields_empty_string() {
        assert_eq!(extract_identifier("https://example.org"), "");
        assert_eq!(extract_identifier("https://example.org/"), "");
        assert_eq!(extract_identifier(""), "");
    }

    #[test]
    fn segment_is_not_normalized() {
        assert_eq!(extract_identifier("https://x/a/PMC 1"), "PMC 1");
        assert_eq!(extract_identifier("https://x/a/PMC%201/"), "PMC%201");
        assert_eq!(extract_identifier("https://x/a/./PMC5/.."), "..");
    }

    #[test]
    fn relative_input_is_treated_as_path() {
        assert_eq!(extract_identifier("pmc/articles/PMC99/"), "PMC99");
        assert_eq!(extract_identifier("PMC100?x=1"), "PMC100");
    }
}
