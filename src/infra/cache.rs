//! Redis cache handle.
//!
//! Parses the cache connection string, opens a managed connection and
//! probes it with a round-trip `PING` before handing it out.

use redis::{aio::ConnectionManager, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::config::{CacheConfig, DEFAULT_REDIS_DB, REDIS_SCHEME_PREFIX};
use crate::errors::{AppResult, StartupError};

/// Address, password and database index of a Redis server.
#[derive(Clone, PartialEq, Eq)]
pub struct CacheEndpoint {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl CacheEndpoint {
    /// Parse `[redis://][[user]:password@]host:port[/db]`.
    ///
    /// Credentials are split at their first `:`, so a password that itself
    /// contains `:` must be written with the (possibly empty) user prefix,
    /// e.g. `:a:b@host:6379`.
    pub fn parse(raw: &str) -> Result<Self, StartupError> {
        let trimmed = raw.trim();
        let rest = trimmed.strip_prefix(REDIS_SCHEME_PREFIX).unwrap_or(trimmed);

        let (credentials, location) = match rest.rsplit_once('@') {
            Some((credentials, location)) => (Some(credentials), location),
            None => (None, rest),
        };

        // `user:password` keeps only the password; a bare token is the password.
        let password = credentials
            .map(|c| c.split_once(':').map_or(c, |(_, password)| password))
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        let (address, db) = match location.split_once('/') {
            None | Some((_, "")) => (location.trim_end_matches('/'), DEFAULT_REDIS_DB),
            Some((address, db)) => {
                let db = db
                    .parse::<u32>()
                    .map_err(|_| invalid("database index must be a non-negative integer"))?;
                (address, i64::from(db))
            }
        };

        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected host:port"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| invalid("port must be a number between 0 and 65535"))?;

        Ok(Self {
            host: host.to_string(),
            port,
            password,
            db,
        })
    }

    /// `host:port`, for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

impl std::fmt::Debug for CacheEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .finish()
    }
}

fn invalid(reason: &str) -> StartupError {
    StartupError::Config(format!("invalid redis connection string: {}", reason))
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    endpoint: CacheEndpoint,
}

impl Cache {
    /// Parse the connection string, connect and probe the server.
    pub async fn connect(config: &CacheConfig) -> Result<Self, StartupError> {
        let endpoint = CacheEndpoint::parse(&config.url)?;

        let client = Client::open(endpoint.connection_info())?;
        let connection = ConnectionManager::new(client).await?;
        let cache = Self {
            connection,
            endpoint,
        };
        cache.probe().await?;

        tracing::info!(address = %cache.endpoint.address(), db = cache.endpoint.db, "Redis cache connected");

        Ok(cache)
    }

    /// Get the connection manager for direct Redis operations.
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    pub fn endpoint(&self) -> &CacheEndpoint {
        &self.endpoint
    }

    /// Round-trip liveness check.
    pub async fn ping(&self) -> AppResult<()> {
        self.probe().await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.connection.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_address() {
        let endpoint = CacheEndpoint::parse("127.0.0.1:6379").unwrap();
        assert_eq!(endpoint.host, "127.0.0.1");
        assert_eq!(endpoint.port, 6379);
        assert_eq!(endpoint.password, None);
        assert_eq!(endpoint.db, 0);
    }

    #[test]
    fn test_parse_password_and_db() {
        let endpoint = CacheEndpoint::parse("s3cret@cache.internal:6380/3").unwrap();
        assert_eq!(endpoint.host, "cache.internal");
        assert_eq!(endpoint.port, 6380);
        assert_eq!(endpoint.password.as_deref(), Some("s3cret"));
        assert_eq!(endpoint.db, 3);
    }

    #[test]
    fn test_parse_url_form() {
        let endpoint = CacheEndpoint::parse("redis://:s3cret@localhost:6379/2").unwrap();
        assert_eq!(endpoint.host, "localhost");
        assert_eq!(endpoint.password.as_deref(), Some("s3cret"));
        assert_eq!(endpoint.db, 2);

        let endpoint = CacheEndpoint::parse("redis://localhost:6379/").unwrap();
        assert_eq!(endpoint.db, 0);
        assert_eq!(endpoint.password, None);
    }

    #[test]
    fn test_parse_password_containing_at() {
        let endpoint = CacheEndpoint::parse("p@ss@localhost:6379").unwrap();
        assert_eq!(endpoint.password.as_deref(), Some("p@ss"));
        assert_eq!(endpoint.address(), "localhost:6379");
    }

    #[test]
    fn test_parse_password_containing_colon_needs_user_prefix() {
        let endpoint = CacheEndpoint::parse(":a:b@localhost:6379").unwrap();
        assert_eq!(endpoint.password.as_deref(), Some("a:b"));

        let endpoint = CacheEndpoint::parse("redis://crawler:a:b@localhost:6379/1").unwrap();
        assert_eq!(endpoint.password.as_deref(), Some("a:b"));
        assert_eq!(endpoint.db, 1);

        // Without the prefix the leading segment is read as a user name.
        let endpoint = CacheEndpoint::parse("a:b@localhost:6379").unwrap();
        assert_eq!(endpoint.password.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["", "localhost", ":6379", "localhost:http", "localhost:6379/-1", "localhost:6379/x"] {
            assert!(
                matches!(CacheEndpoint::parse(raw), Err(StartupError::Config(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let endpoint = CacheEndpoint::parse("hunter2@localhost:6379").unwrap();
        assert!(!format!("{:?}", endpoint).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_connect_fails_fast_on_bad_connection_string() {
        let config = CacheConfig {
            url: "not a redis address".into(),
        };
        assert!(matches!(Cache::connect(&config).await, Err(StartupError::Config(_))));
    }
}
