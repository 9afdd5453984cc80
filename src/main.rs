use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use sheet2pg::config::{Cli, Source};
use sheet2pg::db::{Database, DryRun, Postgres};
use sheet2pg::sheet::{CsvSheet, GoogleSheets, SheetSource};
use sheet2pg::shell::{self, Console};
use sheet2pg::App;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Cli::parse()
        .settings()
        .context("error while config loading")?;

    let pg = Postgres::connect(&settings.postgres).context("error while connecting to postgres")?;
    let db: Box<dyn Database> = if settings.dry_run {
        Box::new(DryRun::new(pg))
    } else {
        Box::new(pg)
    };

    let sheets: Box<dyn SheetSource> = match settings.source {
        Source::Google { cred } => Box::new(
            GoogleSheets::from_credentials(&cred).context("error while reading app.cred")?,
        ),
        Source::Csv(path) => Box::new(CsvSheet::new(path)),
    };

    let mut app = App::new(db, sheets).context("error while preparing the sets table")?;

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    shell::run(&mut app, &mut console)?;
    Ok(())
}
