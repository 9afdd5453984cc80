use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG: &str = "config/config.toml";

/// Contents of the config file.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub db: DbSection,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct AppSection {
    /// Base64-encoded service-account key.
    pub cred: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct DbSection {
    /// Postgres connection string.
    pub postgres: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "sheet2pg",
    version,
    about = "Create Postgres tables from spreadsheet headers and import sheet rows into them"
)]
pub struct Cli {
    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Postgres connection string, overrides db.postgres
    #[arg(long)]
    pub postgres: Option<String>,

    /// Base64 service-account key, overrides app.cred
    #[arg(long)]
    pub cred: Option<String>,

    /// Read sheet values from a local CSV export instead of Google Sheets
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print write statements instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Where spreadsheet values are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Google { cred: String },
    Csv(PathBuf),
}

/// Merged file and command-line settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub postgres: String,
    pub source: Source,
    pub dry_run: bool,
}

/// Reads the config file; a missing file reads as empty.
pub fn load_toml(path: &Path) -> Result<Config> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("config file {} not found", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(Error::Config(format!("{}: {}", path.display(), e))),
    };
    toml::from_str(&s).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

impl Cli {
    pub fn settings(self) -> Result<Settings> {
        let config = load_toml(&self.config)?;
        self.merge(config)
    }

    /// Command-line values win over the file.
    pub fn merge(self, config: Config) -> Result<Settings> {
        let postgres = self
            .postgres
            .or(config.db.postgres)
            .ok_or_else(|| Error::Config("db.postgres is not set".to_string()))?;

        let source = match self.csv {
            Some(path) => Source::Csv(path),
            None => {
                let cred = self
                    .cred
                    .or(config.app.cred)
                    .ok_or_else(|| Error::Config("app.cred is not set".to_string()))?;
                Source::Google { cred }
            }
        };

        Ok(Settings {
            postgres,
            source,
            dry_run: self.dry_run,
        })
    }
}
