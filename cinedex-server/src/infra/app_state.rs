use std::{fmt, sync::Arc};

use cinedex_core::{
    database::{
        MemoryStore,
        ports::{MoviesRepository, UsersRepository},
    },
    domain::users::auth::AuthCrypto,
    query::QueryTranslator,
};

use crate::{
    infra::{config::Config, middleware::rate_limit::RateLimiter},
    users::auth::JwtKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MoviesRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub translator: Arc<QueryTranslator>,
    pub auth_crypto: Arc<AuthCrypto>,
    pub jwt: Arc<JwtKeys>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("translator", &self.translator)
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the stores together with everything derived from `config`.
    pub fn new(
        config: Config,
        movies: Arc<dyn MoviesRepository>,
        users: Arc<dyn UsersRepository>,
        auth_crypto: AuthCrypto,
    ) -> Self {
        let translator = QueryTranslator::new(config.query.clone());
        let jwt = JwtKeys::from_config(&config.auth);
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);

        Self {
            movies,
            users,
            translator: Arc::new(translator),
            auth_crypto: Arc::new(auth_crypto),
            jwt: Arc::new(jwt),
            rate_limiter: Arc::new(rate_limiter),
            config: Arc::new(config),
        }
    }

    pub fn in_memory(
        config: Config,
        store: MemoryStore,
        auth_crypto: AuthCrypto,
    ) -> Self {
        Self::new(config, store.movies, store.users, auth_crypto)
    }
}
