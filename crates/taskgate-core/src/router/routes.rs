/// Access requirements attached to a route record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteMeta {
    pub fn auth() -> Self {
        Self {
            requires_auth: true,
            requires_guest: false,
        }
    }

    pub fn guest() -> Self {
        Self {
            requires_auth: false,
            requires_guest: true,
        }
    }
}

/// A route and its nested children. Child paths are relative to the parent.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn child(mut self, record: RouteRecord) -> Self {
        self.children.push(record);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    /// Routes of the task application: guest-only login and the auth-only task list
    pub fn application() -> Self {
        Self::new(vec![
            RouteRecord::new("/login").named("login").with_meta(RouteMeta::guest()),
            RouteRecord::new("/").named("tasks").with_meta(RouteMeta::auth()),
        ])
    }

    /// Records matched by `path`, outermost first. Empty when nothing matches.
    pub fn resolve(&self, path: &str) -> Vec<&RouteRecord> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let target = segments(path);
        let mut chain = Vec::new();
        if match_chain(&self.records, &target, &mut chain) {
            chain
        } else {
            Vec::new()
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_chain<'a>(
    records: &'a [RouteRecord],
    target: &[&str],
    chain: &mut Vec<&'a RouteRecord>,
) -> bool {
    for record in records {
        let own = segments(&record.path);
        if own.len() > target.len() {
            continue;
        }
        let prefix_matches = own
            .iter()
            .zip(target)
            .all(|(pattern, segment)| pattern.starts_with(':') || pattern == segment);
        if !prefix_matches {
            continue;
        }

        chain.push(record);
        let rest = &target[own.len()..];
        if rest.is_empty() || match_chain(&record.children, rest, chain) {
            return true;
        }
        chain.pop();
    }
    false
}
