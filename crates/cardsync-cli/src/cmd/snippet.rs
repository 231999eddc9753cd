use anyhow::Context;
use cardsync_core::codec;
use std::io::Write;
use std::path::Path;

/// Emit a well-formed comment block for the given title and items: the
/// editor "insert snippet" flow, reduced to the codec's serializer.
pub fn run(title: &str, items: &[String], finalized: bool, file: Option<&Path>) -> anyhow::Result<()> {
    if title.contains(',') {
        anyhow::bail!("title must not contain a comma (it delimits the title in the grammar)");
    }

    let snippet = if finalized {
        codec::serialize_final(title, items)
    } else {
        codec::serialize(title, items)
    };

    match file {
        Some(path) => {
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            writeln!(f, "{snippet}")?;
            println!("Appended task snippet to {}: {title}", path.display());
        }
        None => println!("{snippet}"),
    }
    Ok(())
}
