use crate::server::{ServerConfig, ServerError};
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tictac_engine::ids::{AlphanumericIds, IdGenerator, UuidIds, DEFAULT_ID_LENGTH};

/// How match and player ids are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdScheme {
    /// Fixed-length `[A-Za-z0-9]` codes.
    Alphanumeric,
    /// Random v4 UUIDs.
    Uuid,
}

impl IdScheme {
    pub fn generator(self, length: usize) -> Arc<dyn IdGenerator> {
        match self {
            IdScheme::Alphanumeric => Arc::new(AlphanumericIds::new(length)),
            IdScheme::Uuid => Arc::new(UuidIds),
        }
    }
}

/// Command line and environment settings for the server binary.
#[derive(Debug, Parser)]
#[command(name = "tictac-server", version, about = "Tic-tac-toe API server")]
pub struct ServerArgs {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of accepted API keys
    #[arg(long, env = "API_KEYS", value_delimiter = ',')]
    pub api_keys: Vec<String>,

    /// Length of alphanumeric ids
    #[arg(
        long,
        env = "ID_LENGTH",
        default_value_t = DEFAULT_ID_LENGTH as u8,
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub id_length: u8,

    /// Id scheme for matches and players
    #[arg(long, env = "ID_SCHEME", value_enum, default_value_t = IdScheme::Alphanumeric)]
    pub id_scheme: IdScheme,

    /// Runtime environment; `production` enables restricted mode
    #[arg(long, env = "NODE_ENV")]
    pub node_env: Option<String>,

    /// Restricted mode: match deletion is refused
    #[arg(long)]
    pub production: bool,

    /// Create a follow-up match whenever a match ends
    #[arg(long, env = "CHAIN_NEXT_MATCH")]
    pub chain_next_match: bool,
}

impl ServerArgs {
    pub fn is_production(&self) -> bool {
        self.production
            || self
                .node_env
                .as_deref()
                .is_some_and(|env| env.eq_ignore_ascii_case("production"))
    }

    /// Builds a validated [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// [`ServerError::ConfigError`] when no usable API key was supplied.
    pub fn into_config(self) -> Result<ServerConfig, ServerError> {
        let restricted = self.is_production();
        let config = ServerConfig::new(self.host, self.port, self.api_keys)
            .with_id_scheme(self.id_scheme, usize::from(self.id_length))
            .with_restricted(restricted)
            .with_chain_next_match(self.chain_next_match);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerArgs {
        let mut full = vec!["tictac-server", "--host", "0.0.0.0", "--port", "4000"];
        full.extend_from_slice(args);
        ServerArgs::try_parse_from(full).expect("parse args")
    }

    #[test]
    fn api_keys_are_comma_separated() {
        let args = parse(&["--api-keys", "key1,key2"]);
        assert_eq!(args.api_keys, vec!["key1", "key2"]);

        let config = args.into_config().expect("config");
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 4000);
        assert!(config.api_keys().contains("key2"));
    }

    #[test]
    fn missing_api_keys_fail_validation() {
        let args = parse(&["--api-keys", ""]);
        assert!(matches!(
            args.into_config(),
            Err(ServerError::ConfigError(_))
        ));
    }

    #[test]
    fn node_env_production_restricts() {
        let args = parse(&["--api-keys", "k", "--node-env", "production"]);
        assert!(args.is_production());
        assert!(args.into_config().expect("config").store_config().restricted);

        let args = parse(&["--api-keys", "k", "--node-env", "development"]);
        assert!(!args.is_production());
    }

    #[test]
    fn id_length_is_bounded() {
        let too_long = ServerArgs::try_parse_from([
            "tictac-server",
            "--api-keys",
            "k",
            "--id-length",
            "65",
        ]);
        assert!(too_long.is_err());

        let args = parse(&["--api-keys", "k", "--id-length", "12", "--id-scheme", "uuid"]);
        assert_eq!(args.id_length, 12);
        assert_eq!(args.id_scheme, IdScheme::Uuid);
    }

    #[test]
    fn chaining_flag() {
        let args = parse(&["--api-keys", "k", "--chain-next-match"]);
        let config = args.into_config().expect("config");
        assert!(config.store_config().chain_next_match);
    }
}
