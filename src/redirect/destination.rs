//! Destination URL construction.
//!
//! Filter panel toggles (`expand_filters`, `show_filters`) on the incoming
//! request are copied onto the destination as raw `key=value` pairs. Values are
//! never decoded or checked.

/// Append the allowed query pairs of `request_query` to `destination`.
///
/// A key already present on the destination is left alone. Any `#fragment` on
/// the destination stays at the end.
pub fn build_destination(destination: &str, request_query: Option<&str>, forwarded: &[String]) -> String {
    let Some(query) = request_query.filter(|q| !q.is_empty()) else {
        return destination.to_string();
    };

    let (base, fragment) = match destination.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (destination, None),
    };
    let existing = base.split_once('?').map(|(_, q)| q).unwrap_or("");

    let extra: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| forwarded.iter().any(|key| key == pair_key(pair)))
        .filter(|pair| !existing.split('&').any(|e| pair_key(e) == pair_key(pair)))
        .collect();

    if extra.is_empty() {
        return destination.to_string();
    }

    let mut url = String::with_capacity(destination.len() + query.len() + 1);
    url.push_str(base);
    if !base.contains('?') {
        url.push('?');
    } else if !base.ends_with('?') && !base.ends_with('&') {
        url.push('&');
    }
    url.push_str(&extra.join("&"));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map(|(k, _)| k).unwrap_or(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggles() -> Vec<String> {
        vec!["expand_filters".into(), "show_filters".into()]
    }

    #[test]
    fn test_forwards_toggles() {
        assert_eq!(
            build_destination("/superset/dashboard/3/", Some("expand_filters=0&show_filters=1"), &toggles()),
            "/superset/dashboard/3/?expand_filters=0&show_filters=1"
        );
    }

    #[test]
    fn test_ignores_other_params() {
        assert_eq!(
            build_destination("/superset/dashboard/3/", Some("next=/evil&show_filters=0"), &toggles()),
            "/superset/dashboard/3/?show_filters=0"
        );
        assert_eq!(
            build_destination("/superset/dashboard/3/", Some("next=/evil"), &toggles()),
            "/superset/dashboard/3/"
        );
        assert_eq!(build_destination("/d/", None, &toggles()), "/d/");
    }

    #[test]
    fn test_values_are_opaque() {
        assert_eq!(
            build_destination("/d/", Some("show_filters=yes%20please"), &toggles()),
            "/d/?show_filters=yes%20please"
        );
    }

    #[test]
    fn test_existing_query_and_fragment() {
        assert_eq!(
            build_destination("/d/?native_filters_key=abc#tab", Some("expand_filters=1"), &toggles()),
            "/d/?native_filters_key=abc&expand_filters=1#tab"
        );
        // Configured value wins over the request.
        assert_eq!(
            build_destination("/d/?show_filters=0", Some("show_filters=1&expand_filters=1"), &toggles()),
            "/d/?show_filters=0&expand_filters=1"
        );
    }
}
