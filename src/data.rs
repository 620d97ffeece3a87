use std::{io, path::Path};

use anyhow::{Context, Result};
use log::info;
use machine_learning::dataset::Dataset;
use serde::Deserialize;

/// The amount of features per sample: usage, gfa, volume and floor.
pub const FEATURES: usize = 4;

/// One row of the training CSV. Columns other than these are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BuildingRecord {
    pub usage: f32,
    pub gfa: f32,
    pub volume: f32,
    pub floor: f32,
    pub total_waste: f32,
}

impl BuildingRecord {
    pub fn features(&self) -> [f32; FEATURES] {
        [self.usage, self.gfa, self.volume, self.floor]
    }
}

/// Loads the training CSV at `path`.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open training data '{}'", path.display()))?;

    let dataset = read_records(reader)
        .with_context(|| format!("invalid training data '{}'", path.display()))?;

    info!("loaded {} samples from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Reads training records from any CSV source with a header row.
pub fn read_dataset<R: io::Read>(source: R) -> Result<Dataset> {
    read_records(csv::Reader::from_reader(source))
}

fn read_records<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let mut data = Vec::new();

    for (i, record) in reader.deserialize().enumerate() {
        let record: BuildingRecord = record.with_context(|| format!("record {}", i + 1))?;
        data.extend(record.features());
        data.push(record.total_waste);
    }

    Ok(Dataset::new(data, FEATURES, 1)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_the_named_columns() {
        let csv = "\
id,floor,usage,gfa,volume,total_waste,comment
7,1,1,14,42,12,small school
8,5,2,9526,33341,191,office block
";
        let dataset = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.x().row(0).to_vec(), [1., 14., 42., 1.]);
        assert_eq!(dataset.x().row(1).to_vec(), [2., 9526., 33341., 5.]);
        assert_eq!(dataset.y().column(0).to_vec(), [12., 191.]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "usage,gfa,floor,total_waste\n1,14,1,12\n";
        assert!(read_dataset(csv.as_bytes()).is_err());
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        let csv = "usage,gfa,volume,floor,total_waste\n1,lots,42,1,12\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();

        assert!(format!("{err:#}").contains("record 1"));
    }

    #[test]
    fn header_only_is_empty() {
        let csv = "usage,gfa,volume,floor,total_waste\n";
        assert!(read_dataset(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dataset(dir.path().join("training_data.csv")).is_err());
    }
}
