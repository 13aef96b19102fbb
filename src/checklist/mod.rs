use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::core::{CheckResults, CheckStatus};

pub const ID_FIELD: &str = "id";
pub const STATUS_FIELD: &str = "Status";

const DELIMITER: u8 = b';';

/// One checklist record. Field order follows the file's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRow {
    fields: Vec<(String, String)>,
}

impl ChecklistRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces the value of an existing field. Returns false when the row has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    pub fn status(&self) -> Option<&str> {
        self.get(STATUS_FIELD)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }
}

pub fn load(path: &Path) -> Result<Vec<ChecklistRow>> {
    if !path.exists() {
        bail!("Checkliste wurde nicht gefunden unter {}.", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Checkliste konnte nicht geöffnet werden: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Kopfzeile der Checkliste ist ungültig: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();
    for required in [ID_FIELD, STATUS_FIELD] {
        if !headers.iter().any(|h| h == required) {
            bail!(
                "Spalte '{required}' fehlt in der Checkliste: {}",
                path.display()
            );
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record.with_context(|| format!("Zeile {line} der Checkliste ist ungültig"))?;
        if record.len() > headers.len() {
            bail!(
                "Zeile {line} der Checkliste hat {} Felder, erwartet höchstens {}",
                record.len(),
                headers.len()
            );
        }
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(ChecklistRow::new(fields));
    }
    Ok(rows)
}

/// Sets `Status` on rows whose id is an evaluated check. Returns the number of rows touched.
pub fn apply_results(rows: &mut [ChecklistRow], results: &CheckResults) -> usize {
    let mut updated = 0;
    for row in rows.iter_mut() {
        let Some(passed) = row.id().and_then(|id| results.get(id)) else {
            continue;
        };
        if row.set(STATUS_FIELD, CheckStatus::from_passed(passed).as_str()) {
            updated += 1;
        }
    }
    updated
}

pub fn write(path: &Path, rows: &[ChecklistRow]) -> Result<()> {
    let Some(first) = rows.first() else {
        bail!("Keine Daten zum Schreiben der Checkliste vorhanden.");
    };
    let headers: Vec<&str> = first.field_names().collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Verzeichnis konnte nicht erstellt werden: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("Checkliste konnte nicht geschrieben werden: {}", path.display()))?;
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|name| row.get(name).unwrap_or("")))?;
    }
    writer
        .flush()
        .with_context(|| format!("Checkliste konnte nicht geschrieben werden: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_dir() -> PathBuf {
        static DIR_SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "seocheck-checklist-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    const SAMPLE: &str = "\"id\";\"Status\";\"Aufgabe\"\r\n\
                          \"tech-title\";\"offen\";\"Title prüfen\"\r\n\
                          \"custom-1\";\"offen\";\"Eigene \"\"Aufgabe\"\"; mit Semikolon\"\r\n";

    #[test]
    fn round_trip_without_matching_ids_is_byte_identical() {
        let dir = make_temp_dir();
        let input = dir.join("checklist.csv");
        let output = dir.join("out/checklist_updated.csv");
        std::fs::write(&input, SAMPLE).expect("write input");

        let mut rows = load(&input).expect("load");
        assert_eq!(apply_results(&mut rows, &CheckResults::new()), 0);
        write(&output, &rows).expect("write");

        assert_eq!(std::fs::read_to_string(&output).expect("read"), SAMPLE);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn known_ids_get_localized_status_and_others_are_untouched() {
        let dir = make_temp_dir();
        let input = dir.join("checklist.csv");
        std::fs::write(&input, SAMPLE).expect("write input");

        let mut rows = load(&input).expect("load");
        let mut results = CheckResults::new();
        results.insert("tech-title", true);
        let before = rows[1].clone();

        assert_eq!(apply_results(&mut rows, &results), 1);
        assert_eq!(rows[0].status(), Some("erledigt"));
        assert_eq!(rows[0].get("Aufgabe"), Some("Title prüfen"));
        assert_eq!(rows[1], before);

        results.insert("tech-title", false);
        apply_results(&mut rows, &results);
        assert_eq!(rows[0].status(), Some("offen"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let dir = make_temp_dir();
        let err = load(&dir.join("fehlt.csv")).expect_err("missing file");
        assert!(err.to_string().contains("fehlt.csv"), "{err}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn required_columns_are_enforced() {
        let dir = make_temp_dir();
        let input = dir.join("checklist.csv");
        std::fs::write(&input, "\"id\";\"Titel\"\r\n\"a\";\"b\"\r\n").expect("write");
        let err = load(&input).expect_err("no status column");
        assert!(err.to_string().contains("Status"), "{err}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let dir = make_temp_dir();
        let input = dir.join("checklist.csv");
        std::fs::write(&input, "\"id\";\"Status\";\"Notiz\"\n\"a\";\"offen\"\n").expect("write");
        let rows = load(&input).expect("load");
        assert_eq!(rows[0].get("Notiz"), Some(""));

        std::fs::write(&input, "\"id\";\"Status\"\n\"a\";\"offen\";\"zu viel\"\n").expect("write");
        assert!(load(&input).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn writing_empty_rows_fails() {
        let dir = make_temp_dir();
        let err = write(&dir.join("out.csv"), &[]).expect_err("empty rows");
        assert!(err.to_string().contains("Keine Daten"), "{err}");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
