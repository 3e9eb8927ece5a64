//! Scraping helpers for portal HTML.
//!
//! Gateways redirect with inline scripts and carry per-login tokens in hidden
//! inputs; these helpers pull both out of the page body.

use regex::Regex;
use reqwest::Url;

/// Pattern matching `window.location="..."` script redirects.
pub fn script_redirect_pattern() -> Result<Regex, regex::Error> {
    Regex::new(r#"window\.location(?:\.href)?\s*=\s*["']([^"']*)["']"#)
}

/// Target of a script redirect, if the page has one.
pub fn find_script_redirect(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|target| !target.is_empty())
}

/// Build the pattern matching `<input ... name="<field>" value="<v>">`.
pub fn hidden_input_pattern(field: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"name=["']{}["']\s+value=["']([^"']*)["']"#,
        regex::escape(field)
    ))
}

/// Value of the hidden input named `field`.
pub fn find_hidden_input(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `scheme://host[:port]/` of a URL, where FortiGate-style portals take the form post.
pub fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTAL_PAGE: &str = r#"<html><body>
        <form method="POST" action="/">
        <input type="hidden" name="4Tredir" value="http://1.1.1.1/">
        <input type="hidden" name="magic" value="0a1b2c3d4e5f">
        <input name="username"><input name="password" type="password">
        </form></body></html>"#;

    #[test]
    fn test_find_script_redirect() {
        let pattern = script_redirect_pattern().unwrap();
        let body = r#"<html><script>window.location="https://gw.example:1003/fgtauth?0a1b";</script></html>"#;
        assert_eq!(
            find_script_redirect(&pattern, body).as_deref(),
            Some("https://gw.example:1003/fgtauth?0a1b")
        );
    }

    #[test]
    fn test_find_script_redirect_href_single_quotes() {
        let pattern = script_redirect_pattern().unwrap();
        let body = r#"<script>window.location.href = '/login?x=1'</script>"#;
        assert_eq!(find_script_redirect(&pattern, body).as_deref(), Some("/login?x=1"));
    }

    #[test]
    fn test_find_script_redirect_missing() {
        let pattern = script_redirect_pattern().unwrap();
        assert_eq!(find_script_redirect(&pattern, "<html>Welcome</html>"), None);
        assert_eq!(find_script_redirect(&pattern, r#"window.location="""#), None);
    }

    #[test]
    fn test_find_hidden_input() {
        let magic = hidden_input_pattern("magic").unwrap();
        assert_eq!(
            find_hidden_input(&magic, PORTAL_PAGE).as_deref(),
            Some("0a1b2c3d4e5f")
        );

        let redir = hidden_input_pattern("4Tredir").unwrap();
        assert_eq!(
            find_hidden_input(&redir, PORTAL_PAGE).as_deref(),
            Some("http://1.1.1.1/")
        );
    }

    #[test]
    fn test_find_hidden_input_escapes_field_name() {
        let pattern = hidden_input_pattern("a.b").unwrap();
        assert_eq!(find_hidden_input(&pattern, r#"name="axb" value="1""#), None);
        assert_eq!(
            find_hidden_input(&pattern, r#"name="a.b" value="1""#).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_origin_root() {
        let url = Url::parse("https://gateway.iitk.ac.in:1003/fgtauth?0a1b#frag").unwrap();
        assert_eq!(origin_root(&url).as_str(), "https://gateway.iitk.ac.in:1003/");

        let url = Url::parse("http://10.0.0.1/portal/login.html").unwrap();
        assert_eq!(origin_root(&url).as_str(), "http://10.0.0.1/");
    }
}
