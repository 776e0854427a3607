//! Server configuration, built once at startup from CLI arguments and passed
//! into listener setup. No process-wide mutable state.

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "wikitext_server",
    version,
    about = "HTTP service that parses wikitext into sectioned or flat plain-text documents"
)]
pub struct ServerConfig {
    /// Listening port
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Bind hostname
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Response shape returned by this instance
    #[arg(long, value_enum, default_value = "sectioned")]
    pub shape: ResponseShape,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which of the two response bodies this instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponseShape {
    /// `{ "document": [{ "title": ..., "text": ... }, ...] }`
    Sectioned,
    /// `{ "text": ... }`
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let config = ServerConfig::parse_from(["wikitext_server"]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.shape, ResponseShape::Sectioned);
    }

    #[test]
    fn host_takes_a_string_value() {
        let config =
            ServerConfig::parse_from(["wikitext_server", "--host", "0.0.0.0", "--port", "5000"]);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn shape_selects_the_flat_variant() {
        let config = ServerConfig::parse_from(["wikitext_server", "--shape", "plain"]);
        assert_eq!(config.shape, ResponseShape::Plain);
    }
}
