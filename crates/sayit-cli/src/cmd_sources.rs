use sayit_scrapers::Source;

pub fn execute() -> anyhow::Result<()> {
    for source in Source::ALL {
        let grammar = source.grammar();
        println!("{:<16} instance: {}", source.name(), grammar.instance());
    }
    Ok(())
}
