/// A declared path together with a request path it is expected to match.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    route: Route,
}

impl TestCase {
    pub const fn new(name: &'static str, group: TestGroup, route: Route) -> Self {
        Self { name, group, route }
    }

    pub const fn literal(name: &'static str, route: Route) -> Self {
        Self::new(name, TestGroup::Literal, route)
    }

    pub const fn params(name: &'static str, route: Route) -> Self {
        Self::new(name, TestGroup::Params, route)
    }

    pub const fn optional(name: &'static str, route: Route) -> Self {
        Self::new(name, TestGroup::Optional, route)
    }

    pub const fn wildcard(name: &'static str, route: Route) -> Self {
        Self::new(name, TestGroup::Wildcard, route)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn path(&self) -> &'static str {
        self.route().path
    }

    pub fn url(&self) -> &'static str {
        self.route().url
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Route {
    path: &'static str,
    url: &'static str,
}

impl Route {
    pub const fn new(path: &'static str, url: &'static str) -> Self {
        Self { path, url }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn url(&self) -> &'static str {
        self.url
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Literal,
    Params,
    Optional,
    Wildcard,
}

/// The routes every benchmark runs against, each one hit by its own url.
pub fn test_cases() -> Vec<TestCase> {
    vec![
        TestCase::literal("literal", Route::new("/coffee/menu", "/coffee/menu")),
        TestCase::params("two_params", Route::new("/shops/:shop/coffee/:id", "/shops/berlin/coffee/17")),
        TestCase::optional("three_optional", Route::new("/users/:name?/:age?/:city?", "/users/Tom/30")),
        TestCase::wildcard("wildcard", Route::new("/static/*", "/static/css/site.min.css")),
    ]
}
