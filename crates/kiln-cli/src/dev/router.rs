//! Ordered regular-expression routing.
//!
//! Routes are tried in registration order and the first pattern that matches
//! the request path wins. Anything unmatched goes to the default handler.

use regex::Regex;

/// Capture groups of a matched route, indexed like the regex groups.
///
/// Index 0 is the whole match; groups that did not participate are `None`.
pub type Params = Vec<Option<String>>;

struct Route<H> {
    pattern: Regex,
    handler: H,
}

/// A matched handler and its captures.
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub params: Params,
}

impl<H> RouteMatch<'_, H> {
    /// Capture group `index`, if it participated in the match.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(|p| p.as_deref())
    }
}

/// Pattern router generic over the handler type.
pub struct Router<H> {
    routes: Vec<Route<H>>,
    default: Option<H>,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            default: None,
        }
    }

    /// Register `handler` for paths matching `pattern`.
    ///
    /// Registering the same pattern twice is not detected; the first one
    /// always wins.
    pub fn route(&mut self, pattern: Regex, handler: H) -> &mut Self {
        self.routes.push(Route { pattern, handler });
        self
    }

    /// Register the handler used when no pattern matches.
    pub fn default(&mut self, handler: H) -> &mut Self {
        self.default = Some(handler);
        self
    }

    /// Find the handler for `path`.
    ///
    /// Returns `None` only when nothing matches and no default was set.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_, H>> {
        for route in &self.routes {
            if let Some(captures) = route.pattern.captures(path) {
                let params = captures
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect();
                return Some(RouteMatch {
                    handler: &route.handler,
                    params,
                });
            }
        }

        self.default.as_ref().map(|handler| RouteMatch {
            handler,
            params: Vec::new(),
        })
    }

    /// Number of pattern routes (the default is not counted).
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router
            .route(re(r"^/manifest\.json$"), "manifest")
            .route(re(r"/([a-zA-Z0-9_-]+)\.js$"), "script")
            .route(re(r"\.json$"), "json");

        assert_eq!(*router.find("/manifest.json").unwrap().handler, "manifest");
        assert_eq!(*router.find("/other.json").unwrap().handler, "json");
    }

    #[test]
    fn test_order_is_significant() {
        let mut router = Router::new();
        router
            .route(re(r"/([a-zA-Z0-9_-]+)\.js$"), "script")
            .route(re(r"^/sw\.js$"), "service-worker");

        // The broader pattern was registered first, so it shadows the later one.
        assert_eq!(*router.find("/sw.js").unwrap().handler, "script");
    }

    #[test]
    fn test_captures_are_indexed() {
        let mut router = Router::new();
        router.route(re(r"^/assets/(.*)$"), "asset");

        let matched = router.find("/assets/img/logo.png").unwrap();
        assert_eq!(matched.param(0), Some("/assets/img/logo.png"));
        assert_eq!(matched.param(1), Some("img/logo.png"));
        assert_eq!(matched.param(2), None);
    }

    #[test]
    fn test_unmatched_group_is_none() {
        let mut router = Router::new();
        router.route(re(r"^/(a)?b$"), "ab");

        let matched = router.find("/b").unwrap();
        assert_eq!(matched.params.len(), 2);
        assert_eq!(matched.param(1), None);
    }

    #[test]
    fn test_default_handler() {
        let mut router = Router::new();
        router.route(re(r"^/bundle\.css$"), "style").default("document");

        let matched = router.find("/some/page").unwrap();
        assert_eq!(*matched.handler, "document");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_no_default_returns_none() {
        let mut router: Router<&str> = Router::new();
        router.route(re(r"^/bundle\.css$"), "style");

        assert!(router.find("/index.html").is_none());
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
    }
}
