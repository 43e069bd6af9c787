use url::{ParseError, Url};

/// Joins `path` below `base`.
///
/// `Url::join` replaces the last segment of a base without a trailing
/// slash, so `.../maps/api` is treated as `.../maps/api/`.
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url, ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut base = base.clone();
        base.set_path(&format!("{}/", base.path()));
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_last_segment_without_trailing_slash() {
        let base = Url::parse("https://maps.googleapis.com/maps/api").unwrap();
        let endpoint = join_endpoint(&base, "geocode/json").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json"
        );
    }

    #[test]
    fn should_join_below_trailing_slash() {
        let base = Url::parse("http://localhost:8200/v1/").unwrap();
        let endpoint =
            join_endpoint(&base, "projects/p/databases/(default)/documents:runQuery").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "http://localhost:8200/v1/projects/p/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn should_join_below_bare_host() {
        let base = Url::parse("http://localhost:8200").unwrap();
        let endpoint = join_endpoint(&base, "v1/documents").unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:8200/v1/documents");
    }
}
