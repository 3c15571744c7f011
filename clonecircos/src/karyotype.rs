use std::collections::HashMap;
use std::io::Write;

use log::debug;

use crate::error::{CircosError, CircosResult};
use crate::normalize::NormalizedDataset;
use crate::record::CircosTime;
use crate::tsv::tsv_writer;

const KARYOTYPE_HEADER: [&str; 7] = ["#chr", "-", "ID", "LABEL", "START", "END", "COLOR"];

/// A single timepoint, rendered as one chromosome of the karyotype.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Chromosome {
    id: CircosTime,
    length: usize,
    ordinal: usize,
}

impl Chromosome {
    #[must_use]
    pub fn id(&self) -> &CircosTime {
        &self.id
    }

    /// Number of sequences observed at this timepoint; equal to the number of
    /// bands placed on the chromosome.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn start(&self) -> usize {
        0
    }

    /// Human-readable label, e.g. `d7(12)` for 12 sequences at day 7.
    #[must_use]
    pub fn label(&self) -> String {
        format!("d{}({})", self.id.day_index(), self.length)
    }

    /// Color name of this chromosome, `chr1` for the first timepoint.
    #[must_use]
    pub fn color_key(&self) -> String {
        format!("chr{}", self.ordinal)
    }
}

/// The set of chromosomes, one per distinct Circos time, in order of first
/// appearance in the normalized dataset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Karyotype {
    chromosomes: Vec<Chromosome>,
}

impl Karyotype {
    /// Builds the karyotype of given dataset.
    ///
    /// Returns [`CircosError::EmptyDataset`] if the dataset has no rows.
    pub fn from_dataset(dataset: &NormalizedDataset) -> CircosResult<Self> {
        if dataset.is_empty() {
            return Err(CircosError::EmptyDataset);
        }

        let mut index: HashMap<&CircosTime, usize> = HashMap::new();
        let mut chromosomes: Vec<Chromosome> = Vec::new();
        for record in dataset.records() {
            let time = record.circos_time();
            let position = *index.entry(time).or_insert_with(|| {
                chromosomes.push(Chromosome {
                    id: time.clone(),
                    length: 0,
                    ordinal: chromosomes.len() + 1,
                });
                chromosomes.len() - 1
            });
            chromosomes[position].length += 1;
        }

        debug!("Karyotype has {} chromosomes", chromosomes.len());
        Ok(Self { chromosomes })
    }

    #[must_use]
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Returns the chromosome of given Circos time.
    #[must_use]
    pub fn chromosome(&self, id: &CircosTime) -> Option<&Chromosome> {
        self.chromosomes.iter().find(|chromosome| &chromosome.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Writes the karyotype header followed by one line per chromosome.
    pub fn write<W: Write>(&self, writer: W) -> CircosResult<()> {
        let mut tsv = tsv_writer(writer);
        tsv.write_record(KARYOTYPE_HEADER)?;

        for chromosome in &self.chromosomes {
            tsv.write_record([
                "chr".to_owned(),
                "-".to_owned(),
                chromosome.id.to_string(),
                chromosome.label(),
                chromosome.start().to_string(),
                chromosome.length.to_string(),
                chromosome.color_key(),
            ])?;
        }

        tsv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::_internal_test_data::{table_from_rows, LINEAGE_TABLE, THREE_ROW_TABLE};
    use crate::error::CircosError;
    use crate::karyotype::Karyotype;
    use crate::normalize::NormalizedDataset;
    use crate::record::CircosTime;

    #[test]
    fn test_empty_dataset() {
        let dataset = NormalizedDataset::from_table(&table_from_rows(&[])).unwrap();

        assert!(matches!(
            Karyotype::from_dataset(&dataset),
            Err(CircosError::EmptyDataset)
        ));
    }

    #[test]
    fn test_three_rows() {
        let dataset = NormalizedDataset::from_table(&THREE_ROW_TABLE).unwrap();
        let karyotype = Karyotype::from_dataset(&dataset).unwrap();

        assert_eq!(karyotype.len(), 2);
        let day_0 = &karyotype.chromosomes()[0];
        assert_eq!(day_0.id().as_str(), "Day000");
        assert_eq!(day_0.length(), 2);
        assert_eq!(day_0.label(), "d0(2)");
        assert_eq!(day_0.color_key(), "chr1");

        let day_1 = karyotype
            .chromosome(&CircosTime::from_timepoint("S1-001").unwrap())
            .unwrap();
        assert_eq!(day_1.length(), 1);
        assert_eq!(day_1.color_key(), "chr2");
    }

    #[test]
    fn test_lengths_sum_to_rows() {
        let dataset = NormalizedDataset::from_table(&LINEAGE_TABLE).unwrap();
        let karyotype = Karyotype::from_dataset(&dataset).unwrap();

        let total: usize = karyotype.chromosomes().iter().map(|c| c.length()).sum();
        assert_eq!(total, dataset.len());
    }

    #[test]
    fn test_groups_sharing_a_day_share_a_chromosome() {
        let table = table_from_rows(&[
            ("A-003", Some("1"), "x", "1"),
            ("B-003", Some("1"), "x", "2"),
            ("A-010", Some("1"), "x", "3"),
        ]);
        let dataset = NormalizedDataset::from_table(&table).unwrap();
        let karyotype = Karyotype::from_dataset(&dataset).unwrap();

        let ids: Vec<(&str, usize)> = karyotype
            .chromosomes()
            .iter()
            .map(|c| (c.id().as_str(), c.length()))
            .collect();
        assert_eq!(ids, [("Day003", 2), ("Day010", 1)]);
    }

    #[test]
    fn test_write() {
        let dataset = NormalizedDataset::from_table(&THREE_ROW_TABLE).unwrap();
        let karyotype = Karyotype::from_dataset(&dataset).unwrap();

        let mut data = Vec::new();
        karyotype.write(&mut data).unwrap();

        assert_eq!(
            String::from_utf8(data).unwrap(),
            "#chr\t-\tID\tLABEL\tSTART\tEND\tCOLOR
chr\t-\tDay000\td0(2)\t0\t2\tchr1
chr\t-\tDay001\td1(1)\t0\t1\tchr2
"
        );
    }
}
