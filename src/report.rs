use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use crate::types::RunRecord;

/// Append one record to a CSV run log, writing the header first if the file
/// is new or empty.
pub fn append_record(path: impl AsRef<Path>, record: &RunRecord) -> Result<()> {
    let path = path.as_ref();
    let needs_header = path.metadata().map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::read_to_string;

    fn record(total_happiness: i64) -> RunRecord {
        RunRecord {
            n_people: 8,
            n_tables: 2,
            total_happiness,
            mean_happiness: 3.0,
            median_happiness: 3.0,
            min_happiness: 3,
            max_happiness: 3,
            n_lonely: 0,
            seconds: 0.5,
        }
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");

        append_record(&path, &record(12)).unwrap();
        append_record(&path, &record(4)).unwrap();

        let contents = read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "n_people,n_tables,total_happiness,mean_happiness,median_happiness,min_happiness,max_happiness,n_lonely,seconds",
                "8,2,12,3.0,3.0,3,3,0,0.5",
                "8,2,4,3.0,3.0,3,3,0,0.5",
            ]
        );
    }

    #[test]
    fn records_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        append_record(&path, &record(7)).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<RunRecord> = reader
            .deserialize::<RunRecord>()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![record(7)]);
    }
}
