//! Line grammars of the artifacts that carry URLs.
//!
//! Service-probe lines look like `URL [status] [title] [tech,...]`: the URL is
//! the token before the first whitespace and annotations follow it. Crawl lines
//! are a bare URL per line, possibly padded with whitespace.

const URL_SCHEME_PREFIX: &str = "http";

/// Leading token of an annotated service-probe line, without the annotations.
///
/// Returns `None` for blank lines. No scheme check is applied; this is the
/// form fed to the crawler.
pub fn probe_line_target(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// URL of a service-probe line, kept only when it carries an `http` scheme prefix.
pub fn probe_line_url(line: &str) -> Option<&str> {
    probe_line_target(line).filter(|token| token.starts_with(URL_SCHEME_PREFIX))
}

/// URL of a crawl line, kept only when it carries an `http` scheme prefix.
pub fn crawl_line_url(line: &str) -> Option<&str> {
    let url = line.trim();
    url.starts_with(URL_SCHEME_PREFIX).then_some(url)
}

/// Number of lines containing something other than whitespace.
pub fn count_non_blank(content: &str) -> usize {
    content.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Number of lines, blank ones included. A trailing newline does not open a new line.
pub fn count_raw(content: &str) -> usize {
    content.lines().count()
}

/// Whether `value` appears as a whole line of `content`.
pub fn contains_line(content: &str, value: &str) -> bool {
    content.lines().any(|line| line.trim() == value)
}
