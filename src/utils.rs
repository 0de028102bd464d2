/// Directory under the workspace that holds downloaded assets
pub const ASSETS_DIR: &str = "assets";

/// File name of the mirrored markup inside the workspace
pub const INDEX_FILE: &str = "index.html";

/// Returns true when the URL carries its own http(s) scheme
pub fn is_absolute_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves an attribute value against the origin URL
///
/// Absolute URLs pass through unchanged, scheme-relative URLs (`//cdn/x.js`)
/// take the origin's scheme, and everything else is prefixed with the origin.
pub fn resolve_asset_url(origin: &str, original: &str) -> String {
    let original = original.trim();
    if is_absolute_url(original) {
        return original.to_string();
    }

    if let Some(rest) = original.strip_prefix("//") {
        let scheme = origin.split("://").next().unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }

    let base = origin.trim_end_matches('/');
    let path = original.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Derives the local file name from the basename of a URL's path
pub fn asset_filename(url: &str) -> String {
    // Drop the fragment first, then the query
    let without_fragment = url.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();

    let name = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        "asset".to_string()
    } else {
        name.to_string()
    }
}

/// Site-root path written into the markup for a stored asset
pub fn local_asset_path(filename: &str) -> String {
    format!("/{}/{}", ASSETS_DIR, filename)
}

/// Public retrieval link for an uploaded directory
pub fn gateway_url(content_id: &str, gateway_domain: &str) -> String {
    format!(
        "https://{}.{}/",
        content_id,
        gateway_domain.trim_matches('/').trim_start_matches('.')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_url_resolution() {
        assert_eq!(
            resolve_asset_url("https://example.com", "/img/logo.png"),
            "https://example.com/img/logo.png"
        );
        assert_eq!(
            resolve_asset_url("https://example.com/", "/img/logo.png"),
            "https://example.com/img/logo.png"
        );
        assert_eq!(
            resolve_asset_url("https://example.com", "css/site.css"),
            "https://example.com/css/site.css"
        );
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            resolve_asset_url("https://example.com", "https://cdn.example.net/app.js"),
            "https://cdn.example.net/app.js"
        );
        assert_eq!(
            resolve_asset_url("https://example.com", "HTTP://cdn.example.net/app.js"),
            "HTTP://cdn.example.net/app.js"
        );
        assert_eq!(
            resolve_asset_url("http://example.com", "//cdn.example.net/app.js"),
            "http://cdn.example.net/app.js"
        );
    }

    #[test]
    fn test_asset_filename() {
        assert_eq!(asset_filename("/img/logo.png"), "logo.png");
        assert_eq!(
            asset_filename("https://cdn.example.net/a/b/app.js?v=3"),
            "app.js"
        );
        assert_eq!(asset_filename("style.css#top"), "style.css");
        assert_eq!(asset_filename("https://fonts.example.com/css/"), "css");
        assert_eq!(asset_filename("/"), "asset");
        assert_eq!(asset_filename("?x=1"), "asset");
    }

    #[test]
    fn test_local_asset_path() {
        assert_eq!(local_asset_path("logo.png"), "/assets/logo.png");
    }

    #[test]
    fn test_gateway_url() {
        assert_eq!(
            gateway_url("bafyabc", "ipfs.w3s.link"),
            "https://bafyabc.ipfs.w3s.link/"
        );
        assert_eq!(
            gateway_url("bafyabc", ".ipfs.w3s.link/"),
            "https://bafyabc.ipfs.w3s.link/"
        );
    }
}
