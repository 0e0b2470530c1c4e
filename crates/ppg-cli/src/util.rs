use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use ppg_analysis::roster::{Roster, RosterTable};
use serde::Serialize;
use tracing::info;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        if let Output::File { path, .. } = self {
            info!("wrote {}", path.display());
        }
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Resolves a `--json` argument, where `-` means stdout.
pub fn json_target(path: &Path) -> Option<PathBuf> {
    (path != Path::new("-")).then(|| path.to_path_buf())
}

/// A JSON report body stamped with its creation time.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Report<T> {
    pub fn now(body: T) -> Self {
        Self {
            generated_at: Utc::now(),
            body,
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a roster CSV, keeping the raw table for sanity checks.
pub fn read_roster_file<P>(path: P) -> anyhow::Result<(RosterTable, Roster)>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open roster file: {}", path.display()))?;
    let table = RosterTable::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    let roster = table
        .to_roster()
        .with_context(|| format!("Invalid roster file: {}", path.display()))?;
    info!("loaded {} players from {}", roster.len(), path.display());
    Ok((table, roster))
}

pub fn write_csv<W, T>(writer: W, rows: impl IntoIterator<Item = T>) -> csv::Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_csv<T>(path: &Path, rows: impl IntoIterator<Item = T>) -> anyhow::Result<()>
where
    T: Serialize,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_csv(BufWriter::new(file), rows)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn create_dir(path: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory: {}", path.display()))
}

/// Rounds to three decimal places for CSV output.
pub fn round3(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 1000.0).round() / 1000.0)
}

/// Formats an optional number for table output.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.precision$}"))
}

/// File-name-safe form of a player name.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        player: &'static str,
        ppg: Option<f64>,
    }

    #[test]
    fn csv_leaves_missing_values_blank() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            [
                Row {
                    player: "A",
                    ppg: Some(3.0),
                },
                Row {
                    player: "C",
                    ppg: None,
                },
            ],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "player,ppg\nA,3.0\nC,\n");
    }

    #[test]
    fn rounding_and_formatting() {
        assert_eq!(round3(Some(2.123_56)), Some(2.124));
        assert_eq!(round3(None), None);
        assert_eq!(fmt_opt(Some(1.0 / 3.0), 3), "0.333");
        assert_eq!(fmt_opt(None, 3), "-");
    }

    #[test]
    fn report_flattens_body() {
        #[derive(Serialize)]
        struct Body {
            rows: usize,
        }
        let json = serde_json::to_value(Report::now(Body { rows: 2 })).unwrap();
        assert_eq!(json["rows"], 2);
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn dash_sends_json_to_stdout() {
        assert_eq!(json_target(Path::new("-")), None);
        assert_eq!(
            json_target(Path::new("out/report.json")),
            Some(PathBuf::from("out/report.json"))
        );
        assert!(matches!(
            Output::from_output_path(json_target(Path::new("-"))).unwrap(),
            Output::Stdout { .. }
        ));
    }

    #[test]
    fn file_stems_are_safe() {
        assert_eq!(file_stem("Jane O'Neil"), "Jane_O_Neil");
    }
}
