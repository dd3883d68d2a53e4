use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{JwtTokenGenerator, JwtTokenValidator};
use crate::authz::AuthorizationPolicy;
use crate::context::ServerContext;
use crate::db::config::DbConfig;
use crate::dirs;
use crate::logs::LogsConfig;
use crate::restful::RestfulServer;

use super::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,

    #[serde(default)]
    pub ssl: bool,

    /// HMAC secret for access tokens, supports `$VAR` expansion.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "ServerConfig::default_token_expiration_secs")]
    pub token_expiration_secs: u64,

    #[serde(default = "ServerConfig::default_salt_length")]
    pub salt_length: usize,

    /// Mark the `access_token` cookie as `Secure`.
    #[serde(default)]
    pub secure_cookie: bool,

    pub keep_alive_secs: Option<u64>,

    pub workers: Option<u64>,

    pub payload_limit_mib: Option<u64>,

    #[serde(default)]
    pub db: DbConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(skip)]
    pki_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: Self::default_bind(),
            ssl: false,
            jwt_secret: String::new(),
            token_expiration_secs: Self::default_token_expiration_secs(),
            salt_length: Self::default_salt_length(),
            secure_cookie: false,
            keep_alive_secs: None,
            workers: None,
            payload_limit_mib: None,
            db: DbConfig::default(),
            logs: LogsConfig::default(),
            pki_dir: PathBuf::new(),
        }
    }
}

impl CommonConfig for ServerConfig {
    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.bind.is_empty() {
            bail!("bind is required");
        }

        self.jwt_secret = expandenv("jwt_secret", &self.jwt_secret)?;
        if self.jwt_secret.is_empty() {
            bail!("jwt_secret is required");
        }

        if self.salt_length < Self::MIN_SALT_LENGTH || self.salt_length > Self::MAX_SALT_LENGTH {
            bail!(
                "salt_length must be in range [{}, {}]",
                Self::MIN_SALT_LENGTH,
                Self::MAX_SALT_LENGTH
            );
        }

        if self.token_expiration_secs < Self::MIN_TOKEN_EXPIRATION_SECS
            || self.token_expiration_secs > Self::MAX_TOKEN_EXPIRATION_SECS
        {
            bail!(
                "token_expiration_secs must be in range [{}, {}]",
                Self::MIN_TOKEN_EXPIRATION_SECS,
                Self::MAX_TOKEN_EXPIRATION_SECS
            );
        }

        if let Some(0) = self.workers {
            bail!("workers must be greater than 0");
        }
        if let Some(0) = self.payload_limit_mib {
            bail!("payload_limit_mib must be greater than 0");
        }

        self.db.complete(ps).context("db")?;
        self.logs.validate().context("logs")?;

        if self.ssl {
            self.pki_dir = ps.config_dir.join("pki");
            dirs::ensure_dir_exists(&self.pki_dir).context("ensure pki dir")?;
        }

        Ok(())
    }
}

impl ServerConfig {
    const MIN_SALT_LENGTH: usize = 8;
    const MAX_SALT_LENGTH: usize = 100;

    const MIN_TOKEN_EXPIRATION_SECS: u64 = 60;
    const MAX_TOKEN_EXPIRATION_SECS: u64 = 60 * 60 * 24 * 365;

    pub fn build_ctx(&self) -> Result<Arc<ServerContext>> {
        let db = self.db.build().context("init database")?;

        let secret = self.jwt_secret.as_bytes();
        let ctx = ServerContext {
            db,
            jwt_generator: JwtTokenGenerator::new(secret, self.token_expiration_secs),
            jwt_validator: JwtTokenValidator::new(secret),
            policy: AuthorizationPolicy::default(),
            cfg: self.clone(),
        };
        Ok(Arc::new(ctx))
    }

    pub fn build_restful_server(&self, ctx: Arc<ServerContext>) -> Result<RestfulServer> {
        let mut srv = RestfulServer::new(self.bind.clone(), ctx);
        if self.ssl {
            let ssl = self.build_ssl()?;
            srv.set_ssl(ssl);
        }

        if let Some(keep_alive_secs) = self.keep_alive_secs {
            srv.set_keep_alive_secs(keep_alive_secs);
        }

        if let Some(workers) = self.workers {
            srv.set_workers(workers);
        }

        if let Some(payload_limit_mib) = self.payload_limit_mib {
            srv.set_payload_limit_mib(payload_limit_mib);
        }

        Ok(srv)
    }

    fn build_ssl(&self) -> Result<SslAcceptorBuilder> {
        let key_path = self.pki_dir.join("key.pem");
        if !key_path.exists() {
            bail!("ssl key file not exists: {:?}", key_path);
        }

        let cert_path = self.pki_dir.join("cert.pem");
        if !cert_path.exists() {
            bail!("ssl cert file not exists: {:?}", cert_path);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&key_path, SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&cert_path)
            .context("load ssl cert file")?;

        Ok(builder)
    }

    fn default_bind() -> String {
        String::from("127.0.0.1:8080")
    }

    fn default_salt_length() -> usize {
        24
    }

    fn default_token_expiration_secs() -> u64 {
        60 * 60 * 24 // 1 day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_set() -> (PathSet, PathBuf) {
        let root = std::env::temp_dir().join(format!("trivoxel-server-config-{}", std::process::id()));
        let ps = PathSet::new(Some(root.join("config")), Some(root.join("data"))).unwrap();
        (ps, root)
    }

    #[test]
    fn test_complete() {
        let (ps, root) = path_set();

        let mut cfg: ServerConfig = toml::from_str(
            r#"
            jwt_secret = "secret"
            salt_length = 16

            [db.sqlite]
            memory = true
            "#,
        )
        .unwrap();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:8080");
        assert_eq!(cfg.salt_length, 16);
        assert!(cfg.db.sqlite.memory);

        let mut cfg = ServerConfig::default();
        assert!(cfg.complete(&ps).is_err());

        for toml_str in [
            "jwt_secret = 'x'\nsalt_length = 4",
            "jwt_secret = 'x'\nsalt_length = 101",
            "jwt_secret = 'x'\ntoken_expiration_secs = 10",
            "jwt_secret = 'x'\nworkers = 0",
            "jwt_secret = 'x'\n[logs]\nlevel = 'loud'",
        ] {
            let mut cfg: ServerConfig = toml::from_str(toml_str).unwrap();
            assert!(cfg.complete(&ps).is_err(), "{toml_str}");
        }

        let _ = std::fs::remove_dir_all(root);
    }
}
