use native_tls::TlsConnector;
use postgres::types::ToSql;
use postgres::{Client, Config};
use postgres_native_tls::MakeTlsConnector;

use crate::error::{Error, Result};

/// The database the importer writes to.
///
/// Parameters are always bound as text; statements cast them where the
/// target column needs another type.
pub trait Database {
    /// Runs a statement, returning the number of rows affected.
    fn execute(&mut self, statement: &str, params: &[&str]) -> Result<u64>;

    /// Runs a query expected to return at most one row, with every column
    /// read as text.
    fn query_row(&mut self, statement: &str, params: &[&str]) -> Result<Option<Vec<String>>>;

    /// Whether writes are printed instead of executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

pub struct Postgres {
    client: Client,
}

impl Postgres {
    /// Connects with TLS when the server offers it, as `sslmode` asks.
    pub fn connect(url: &str) -> Result<Postgres> {
        let config = connection_config(url)?;
        let mut client = config
            .connect(tls()?)
            .map_err(|e| Error::Connection(e.to_string()))?;
        client
            .simple_query("SELECT 1")
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Postgres { client })
    }
}

pub fn connection_config(url: &str) -> Result<Config> {
    url.parse::<Config>()
        .map_err(|e| Error::Config(format!("db.postgres: {}", e)))
}

fn tls() -> Result<MakeTlsConnector> {
    let connector = TlsConnector::new().map_err(|e| Error::Connection(e.to_string()))?;
    Ok(MakeTlsConnector::new(connector))
}

fn bind<'a>(params: &'a [&'a str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

impl Database for Postgres {
    fn execute(&mut self, statement: &str, params: &[&str]) -> Result<u64> {
        log::debug!("{}", statement);
        let n = self.client.execute(statement, &bind(params))?;
        Ok(n)
    }

    fn query_row(&mut self, statement: &str, params: &[&str]) -> Result<Option<Vec<String>>> {
        log::debug!("{}", statement);
        match self.client.query_opt(statement, &bind(params))? {
            None => Ok(None),
            Some(row) => {
                let mut fields = Vec::with_capacity(row.len());
                for i in 0..row.len() {
                    fields.push(row.try_get::<_, String>(i)?);
                }
                Ok(Some(fields))
            }
        }
    }
}

/// Passes reads through and prints writes instead of running them.
pub struct DryRun<D> {
    inner: D,
}

impl<D: Database> DryRun<D> {
    pub fn new(inner: D) -> DryRun<D> {
        DryRun { inner }
    }
}

impl<D: Database> Database for DryRun<D> {
    fn execute(&mut self, statement: &str, params: &[&str]) -> Result<u64> {
        if params.is_empty() {
            println!("{};", statement);
        } else {
            println!("{}; -- {:?}", statement, params);
        }
        Ok(0)
    }

    fn query_row(&mut self, statement: &str, params: &[&str]) -> Result<Option<Vec<String>>> {
        self.inner.query_row(statement, params)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
