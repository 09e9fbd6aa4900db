use crate::{
    allocate::{Arrangement, Entry},
    constants::{
        BEATS_HEADER, LENGTH_COLUMN_WIDTH, MEASURES_HEADER, NAME_COLUMN_WIDTH, SECTION_HEADER,
    },
    error::{ArrangerError, Result},
    sections::SectionCatalog,
};
use serde::{Deserialize, Serialize};
use std::{io::Write, str::FromStr};
use strum_macros::{Display, EnumString};

/// How an arrangement is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| ArrangerError::UnknownFormat(name.to_string()))
    }
}

#[derive(Serialize)]
struct Row<'a> {
    section: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    measures: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    beats: Option<f64>,
}

impl<'a> From<&Entry<'a>> for Row<'static> {
    fn from(entry: &Entry<'a>) -> Self {
        Row {
            section: entry.label(),
            measures: entry.measures(),
            beats: entry.beats(),
        }
    }
}

pub fn render<W: Write>(arrangement: &Arrangement, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(arrangement, out),
        OutputFormat::Csv => render_csv(arrangement, out),
        OutputFormat::Json => render_json(arrangement, out),
    }
}

pub fn render_to_string(arrangement: &Arrangement, format: OutputFormat) -> Result<String> {
    let mut buf = Vec::new();
    render(arrangement, format, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `Verse     :  20 bars`, one line per entry
fn render_text<W: Write>(arrangement: &Arrangement, out: &mut W) -> Result<()> {
    for entry in arrangement.entries() {
        let length = match entry {
            Entry::Section(section) => section
                .measures()
                .map(|m| format!(" {} bars", m))
                .unwrap_or_default(),
            Entry::Fade(fade) => format!(" {} beats", fade.beats),
        };
        writeln!(
            out,
            "{:<name$}:{:>len$}",
            entry.label(),
            length,
            name = NAME_COLUMN_WIDTH,
            len = LENGTH_COLUMN_WIDTH
        )?;
    }
    Ok(())
}

fn render_csv<W: Write>(arrangement: &Arrangement, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([SECTION_HEADER, MEASURES_HEADER, BEATS_HEADER])?;
    for entry in arrangement.entries() {
        let measures = entry.measures().map(|m| m.to_string()).unwrap_or_default();
        let beats = entry.beats().map(format_beats).unwrap_or_default();
        writer.write_record([entry.label(), measures.as_str(), beats.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn render_json<W: Write>(arrangement: &Arrangement, out: &mut W) -> Result<()> {
    let rows: Vec<Row> = arrangement.entries().map(|e| Row::from(&e)).collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}

/// Whole beat counts without a trailing `.0`
fn format_beats(beats: f64) -> String {
    if beats.fract() == 0.0 {
        format!("{}", beats as i64)
    } else {
        format!("{}", beats)
    }
}

/// List the catalog in declaration order
pub fn render_catalog<W: Write>(catalog: &SectionCatalog, out: &mut W) -> Result<()> {
    for (kind, def) in catalog.entries() {
        writeln!(
            out,
            "{:<name$} weight {:>4}  rank {:>2}  even {:<5}  balance {}",
            kind.to_string(),
            def.weight,
            def.rank,
            def.even,
            def.balance,
            name = NAME_COLUMN_WIDTH
        )?;
    }
    Ok(())
}
