macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub const HEALTH: &str = v1_path!("/health");

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const LOGIN: &str = v1_path!("/auth/login");
        pub const ME: &str = v1_path!("/auth/me");
    }

    pub mod movies {
        pub const COLLECTION: &str = v1_path!("/movies");
        pub const STATS: &str = v1_path!("/movies/stats");
        pub const ITEM: &str = v1_path!("/movies/{id}");
    }

    pub mod users {
        pub const COLLECTION: &str = v1_path!("/users");
        pub const CURRENT: &str = v1_path!("/users/me");
        pub const ITEM: &str = v1_path!("/users/{id}");
    }
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Append an already-encoded query string to the provided route.
    pub fn with_query(route: &str, query: &str) -> String {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            route.to_string()
        } else {
            format!("{route}?{query}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_routes_expand_their_id() {
        let path = utils::replace_param(v1::movies::ITEM, "{id}", "abc");
        assert_eq!(path, "/api/v1/movies/abc");
        assert_eq!(
            utils::with_query(v1::movies::COLLECTION, "?page=2"),
            "/api/v1/movies?page=2"
        );
    }
}
