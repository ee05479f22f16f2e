/// A route and the sub-component names that navigate to it.
pub struct RouteInfo {
    pub route: &'static str,
    pub nodes: &'static [&'static str],
}

/// Navigation table used when the dashboard manifest declares none.
pub const DEFAULT_ROUTES: &[RouteInfo] = &[
    RouteInfo {
        route: "/power",
        nodes: &["part15-2_-_Part", "part14-1_-_Part"],
    },
    RouteInfo {
        route: "/solar",
        nodes: &["part11-1_-_Part_2"],
    },
    RouteInfo {
        route: "/antenna",
        nodes: &["Hole122_-_Part_2"],
    },
];

pub fn default_route_for(node_name: &str) -> Option<&'static str> {
    DEFAULT_ROUTES
        .iter()
        .find(|info| info.nodes.contains(&node_name))
        .map(|info| info.route)
}
