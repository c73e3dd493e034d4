// Command-line interface for docrelay

use clap::Parser;
use std::path::PathBuf;

/// docrelay - translate PDF documents through DeepL, Google, ApyHub or Yandex
#[derive(Parser, Debug, Default)]
#[command(name = "docrelay", version, about, long_about = None)]
pub struct Args {
    /// Configuration file (default: ~/.docrelay/config.toml)
    #[arg(short, long, env = "DOCRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding the configuration
    #[arg(long, env = "DOCRELAY_HOST")]
    pub host: Option<String>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long, env = "DOCRELAY_PORT")]
    pub port: Option<u16>,

    /// Print the effective configuration with secrets redacted and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Apply the flags that override configuration values.
    pub fn apply(&self, config: &mut crate::config::AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from(["docrelay", "--host", "0.0.0.0", "--port", "8080"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::try_parse_from(["docrelay"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 5000);
        assert!(!args.print_config);
    }
}
