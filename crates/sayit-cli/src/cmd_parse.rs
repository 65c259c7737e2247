use std::io::Write;
use std::path::Path;

use anyhow::Context;

use sayit_core::{dates, Speeches};
use sayit_import::SourceDocument;
use sayit_scrapers::Source;

pub fn execute(source: Source, file: &Path, date: Option<&str>) -> anyhow::Result<()> {
    let mut doc = SourceDocument::from_path(file)?;
    if let Some(date) = date {
        let date = dates::parse_iso_date(date)
            .with_context(|| format!("--date {date:?} is not YYYY-MM-DD"))?;
        doc.meta.date = Some(date);
    }
    let grammar = source.grammar();
    if grammar.skip_document(&doc.meta) {
        eprintln!("{} is listed as unparseable for {source}", doc.meta.id);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut count = 0;
    for record in Speeches::new(grammar, doc.lines, doc.meta.clone()).records() {
        let record = record.with_context(|| format!("parsing {}", file.display()))?;
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
        count += 1;
    }
    tracing::info!(doc = %doc.meta.id, speeches = count, "parsed");
    Ok(())
}
