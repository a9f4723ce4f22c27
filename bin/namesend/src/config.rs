use config::{Config, File};
use namesend_models::{
    default_chains, default_domains, default_tokens, ChainConfig, ChainTable, DomainRecord,
    DomainRegistry, ProtocolKind, RegistryError, TokenEntry, TokenTable,
};
use namesend_resolver::{ExternalResolutionConfig, NameServiceConfig};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "namesend.toml";

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to load config: {}", source))]
    Load { source: config::ConfigError },

    #[snafu(display("Invalid registry tables: {}", source))]
    Registry { source: RegistryError },

    #[snafu(display("{what} refers to chain {chain_id}, which is not configured"))]
    UnknownChain { what: String, chain_id: u64 },

    #[snafu(display("Failed to serialize config: {}", source))]
    Serialize { source: toml::ser::Error },

    #[snafu(display("Failed to create config file: {}", source))]
    Create { source: std::io::Error },
}

type Result<T> = std::result::Result<T, SettingsError>;

/// Everything the resolver and orchestrator read. A list present in the file
/// replaces the built-in list of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Upper bound on the receipt wait. Unset waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_timeout_secs: Option<u64>,
    pub name_service: NameServiceConfig,
    pub external_resolution: ExternalResolutionConfig,
    pub chains: Vec<ChainConfig>,
    pub tokens: Vec<TokenEntry>,
    pub domains: Vec<DomainRecord>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            receipt_timeout_secs: None,
            name_service: NameServiceConfig::default(),
            external_resolution: ExternalResolutionConfig::default(),
            chains: default_chains(),
            tokens: default_tokens(),
            domains: default_domains(),
        }
    }
}

/// Validated, indexed forms of the settings lists.
#[derive(Debug, Clone)]
pub struct Tables {
    pub chains: ChainTable,
    pub tokens: TokenTable,
    pub domains: DomainRegistry,
}

impl Settings {
    /// Reads `path`, or `namesend.toml` in the working directory when it
    /// exists, falling back to the built-in tables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(source)
            .build()
            .context(LoadSnafu)?;

        settings.try_deserialize().context(LoadSnafu)
    }

    pub fn write_default(path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(&Settings::default()).context(SerializeSnafu)?;
        std::fs::write(path, toml).context(CreateSnafu)?;

        tracing::info!("Created default config file at {}", path.display());
        Ok(())
    }

    pub fn receipt_timeout(&self) -> Option<Duration> {
        self.receipt_timeout_secs.map(Duration::from_secs)
    }

    pub fn tables(&self) -> Result<Tables> {
        let chains = ChainTable::new(self.chains.clone()).context(RegistrySnafu)?;
        let tokens = TokenTable::new(self.tokens.clone()).context(RegistrySnafu)?;
        let domains = DomainRegistry::new(self.domains.clone()).context(RegistrySnafu)?;

        for record in &self.domains {
            if record.protocol == ProtocolKind::ContractRegistry {
                ensure!(
                    chains.get(record.chain_id).is_some(),
                    UnknownChainSnafu {
                        what: format!("Domain suffix {}", record.suffix),
                        chain_id: record.chain_id,
                    }
                );
            }
        }
        ensure!(
            chains.get(self.name_service.chain_id).is_some(),
            UnknownChainSnafu {
                what: "The name service",
                chain_id: self.name_service.chain_id,
            }
        );
        for layer in &self.external_resolution.layers {
            ensure!(
                chains.get(layer.chain_id).is_some(),
                UnknownChainSnafu {
                    what: format!("Resolution layer {}", layer.name),
                    chain_id: layer.chain_id,
                }
            );
        }

        Ok(Tables {
            chains,
            tokens,
            domains,
        })
    }
}
