use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use sayit_import::{BatchReport, Importer, SourceDocument};
use sayit_scrapers::Source;
use sayit_store::{MemorySink, Sink, SqliteSink};

use crate::config::Config;

pub struct ImportParams<'a> {
    pub source: Source,
    pub files: &'a [PathBuf],
    pub commit: bool,
    pub db: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub instance_prefix: Option<&'a str>,
}

pub fn execute(params: &ImportParams<'_>) -> anyhow::Result<()> {
    let config = Config::load(params.config)?;
    let commit = params.commit || config.commit;
    let db_path = config.database_path(params.db)?;
    let prefix = params
        .instance_prefix
        .map(str::to_string)
        .or(config.instance_prefix.clone());

    // A dry run against a database that does not exist yet stays in memory.
    let mut sink: Box<dyn Sink> = if commit || db_path.exists() {
        Box::new(
            SqliteSink::open_or_create(&db_path, commit)
                .with_context(|| format!("opening {}", db_path.display()))?,
        )
    } else {
        Box::new(MemorySink::new())
    };

    let mut docs = Vec::new();
    let mut unread = Vec::new();
    for path in params.files {
        match SourceDocument::from_path(path) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read document");
                unread.push((path.display().to_string(), e));
            }
        }
    }

    let mut report = Importer::new(&mut *sink)
        .with_instance_prefix(prefix)
        .import_batch(params.source, docs);
    report.failures.extend(unread);

    print_report(&report, commit);
    if !report.is_clean() {
        bail!("{} document(s) failed", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &BatchReport, commit: bool) {
    for (doc, speeches) in &report.imported {
        println!("imported  {doc} ({speeches} speeches)");
    }
    for doc in &report.duplicates {
        println!("unchanged {doc}");
    }
    for doc in &report.skipped {
        println!("skipped   {doc}");
    }
    for (doc, err) in &report.failures {
        println!("FAILED    {doc}: {err}");
    }
    let mode = if commit { "committed" } else { "dry run, nothing written" };
    println!(
        "\n{} documents, {} speeches ({mode})",
        report.imported.len(),
        report.speeches()
    );
}

pub fn history(db: Option<&Path>, config: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config)?;
    let db_path = config.database_path(db)?;
    if !db_path.exists() {
        println!("Nothing imported yet ({} does not exist).", db_path.display());
        return Ok(());
    }
    let sink = SqliteSink::open(&db_path, false)
        .with_context(|| format!("opening {}", db_path.display()))?;
    let rows = sink.imports()?;
    if rows.is_empty() {
        println!("Nothing imported yet.");
        return Ok(());
    }
    for row in &rows {
        println!(
            "{}  {:<20} {:<24} {:>5} speeches  {}",
            row.imported_at,
            row.instance,
            row.document,
            row.speeches,
            &row.digest[..12.min(row.digest.len())]
        );
    }
    Ok(())
}
