use url::Url;

/// Split pasted text into download URLs.
///
/// Tokens are separated by any whitespace (so one URL per line works, as do
/// space separated lists). Scheme-less tokens such as `youtu.be/abc` get an
/// `https://` prefix. Anything that still isn't an http(s) URL is dropped,
/// and duplicates keep their first position.
pub fn parse_urls(raw: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for token in raw.split_whitespace() {
        match normalize_url(token) {
            Some(url) => {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
            None => tracing::warn!(token, "ignoring input that is not a URL"),
        }
    }

    urls
}

fn normalize_url(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let parsed = match Url::parse(token) {
        Ok(url) => url,
        // "youtube.com/watch?v=..." has no scheme
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let url = Url::parse(&format!("https://{}", token)).ok()?;
            if !url.host_str()?.contains('.') {
                return None;
            }
            url
        }
        Err(_) => return None,
    };

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed.to_string()),
        _ => None,
    }
}
