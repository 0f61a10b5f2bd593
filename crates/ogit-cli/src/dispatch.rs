//! Formatting of decoded objects for the terminal.

use std::io::Write;

use ogit_store::{ObjectKind, RawObject, Tree};

/// Pretty-print an object the way `cat-file -p` does.
///
/// Blobs and commits are written byte-exact with nothing appended. Trees
/// print one entry name per line in stored order.
pub fn print_object(raw: &RawObject, out: &mut dyn Write) -> anyhow::Result<()> {
    match raw.kind {
        ObjectKind::Blob | ObjectKind::Commit => out.write_all(&raw.payload)?,
        ObjectKind::Tree => print_names(&Tree::from_raw_object(raw)?, out)?,
    }
    Ok(())
}

/// One entry name per line, in stored order.
pub fn print_names(tree: &Tree, out: &mut dyn Write) -> anyhow::Result<()> {
    for entry in &tree.entries {
        writeln!(out, "{}", entry.name)?;
    }
    Ok(())
}

/// `<mode> <type> <id>\t<name>` per entry, mode zero-padded to six digits.
pub fn print_long(tree: &Tree, out: &mut dyn Write) -> anyhow::Result<()> {
    for entry in &tree.entries {
        writeln!(
            out,
            "{:06o} {} {}\t{}",
            entry.mode.mode_bits(),
            entry.mode.object_kind(),
            entry.object_id,
            entry.name
        )?;
    }
    Ok(())
}
