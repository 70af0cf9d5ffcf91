use crate::dataset::{self, CanonicalDataset};
use crate::models::CanonicalRow;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Column order of every CSV export.
pub const CSV_HEADER: [&str; 5] = ["ISO3Code", "Country", "Year", "Value", "Indicator"];

/// Download file name for an indicator, e.g. `europe_GDP_per_capita_(US$).csv`.
pub fn export_file_name(indicator: &str) -> String {
    format!("europe_{}.csv", indicator.replace(' ', "_"))
}

/// Write rows as CSV with header. The header is written even for no rows.
pub fn write_csv<'a, W: Write>(
    rows: impl IntoIterator<Item = &'a CanonicalRow>,
    writer: W,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse a CSV produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CanonicalRow>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<CanonicalRow>().enumerate() {
        out.push(rec.with_context(|| format!("parse csv row {}", i + 1))?);
    }
    Ok(out)
}

/// Save every row of `indicator` into `dir` under [`export_file_name`].
pub fn save_indicator_csv<P: AsRef<Path>>(
    ds: &CanonicalDataset,
    indicator: &str,
    dir: P,
) -> Result<PathBuf> {
    let path = dir.as_ref().join(export_file_name(indicator));
    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    write_csv(dataset::indicator_rows(ds, indicator), f)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Save rows as pretty JSON array.
pub fn save_json<'a, P: AsRef<Path>>(
    rows: impl IntoIterator<Item = &'a CanonicalRow>,
    path: P,
) -> Result<()> {
    let rows: Vec<&CanonicalRow> = rows.into_iter().collect();
    let mut f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let s = serde_json::to_string_pretty(&rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
