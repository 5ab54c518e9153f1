//! Reads seen while loading a locus, and the links between mates.
use definitions::{ReadRecord, Sample, Strand};
use std::collections::HashMap;

/// Whether the read was aligned near the locus or pulled in through its mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadCode {
    Mapped,
    Unmapped,
}

#[derive(Debug, Clone)]
pub struct ReadInfo {
    pub name: String,
    pub sample: Sample,
    pub strand: Strand,
    pub mate_order: u8,
    pub code: ReadCode,
    pub is_ref: bool,
    /// Index of the mate in the registry.
    pub mate: Option<usize>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
    /// The trimmed range that went into the graph. `None` if the read was dropped.
    pub loaded: Option<(usize, usize)>,
}

impl ReadInfo {
    pub fn from_record(record: &ReadRecord) -> Self {
        let code = match record.mapped {
            true => ReadCode::Mapped,
            false => ReadCode::Unmapped,
        };
        Self {
            name: record.name.clone(),
            sample: record.sample,
            strand: record.strand,
            mate_order: record.mate_order,
            code,
            is_ref: record.is_reference,
            mate: None,
            seq: record.seq().to_ascii_uppercase(),
            qual: record.qual().to_vec(),
            loaded: None,
        }
    }
    /// The part of the read loaded into the graph.
    pub fn loaded_seq(&self) -> Option<&[u8]> {
        let (start, end) = self.loaded?;
        self.seq.get(start..end)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadRegistry {
    reads: Vec<ReadInfo>,
    by_name: HashMap<String, Vec<usize>>,
}

impl ReadRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.reads.len()
    }
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }
    pub fn get(&self, id: usize) -> Option<&ReadInfo> {
        self.reads.get(id)
    }
    pub fn get_mut(&mut self, id: usize) -> Option<&mut ReadInfo> {
        self.reads.get_mut(id)
    }
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ReadInfo)> {
        self.reads.iter().enumerate()
    }
    pub fn add_read(&mut self, record: &ReadRecord) -> usize {
        let id = self.reads.len();
        self.reads.push(ReadInfo::from_record(record));
        self.by_name
            .entry(record.name.clone())
            .or_default()
            .push(id);
        id
    }
    /// Link the first and second mates sharing a name. Returns the number of pairs.
    pub fn add_mates(&mut self) -> usize {
        let mut pairs = vec![];
        for ids in self.by_name.values() {
            let first = ids.iter().find(|&&i| self.reads[i].mate_order == 1);
            let second = ids.iter().find(|&&i| self.reads[i].mate_order == 2);
            if let (Some(&i), Some(&j)) = (first, second) {
                pairs.push((i, j));
            }
        }
        for &(i, j) in pairs.iter() {
            self.reads[i].mate = Some(j);
            self.reads[j].mate = Some(i);
        }
        pairs.len()
    }
    pub fn count_mapped_reads(&self) -> usize {
        self.count_code(ReadCode::Mapped)
    }
    pub fn count_unmapped_reads(&self) -> usize {
        self.count_code(ReadCode::Unmapped)
    }
    fn count_code(&self, code: ReadCode) -> usize {
        self.reads
            .iter()
            .filter(|r| !r.is_ref && r.code == code)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn mates_and_codes() {
        let mut registry = ReadRegistry::new();
        let mut r1 = ReadRecord::new("pair", "acgt", Sample::Tumor, Strand::Forward);
        r1.mate_order = 1;
        let mut r2 = ReadRecord::new("pair", "TTTT", Sample::Tumor, Strand::Reverse);
        r2.mate_order = 2;
        r2.mapped = false;
        let single = ReadRecord::new("single", "GGGG", Sample::Normal, Strand::Forward);
        let a = registry.add_read(&r1);
        let b = registry.add_read(&r2);
        let c = registry.add_read(&single);
        assert_eq!(registry.add_mates(), 1);
        assert_eq!(registry.get(a).and_then(|r| r.mate), Some(b));
        assert_eq!(registry.get(b).and_then(|r| r.mate), Some(a));
        assert_eq!(registry.get(c).and_then(|r| r.mate), None);
        assert_eq!(registry.get(a).map(|r| r.seq.clone()), Some(b"ACGT".to_vec()));
        assert_eq!(registry.count_mapped_reads(), 2);
        assert_eq!(registry.count_unmapped_reads(), 1);
        assert!(registry.get(a).and_then(|r| r.loaded_seq()).is_none());
        if let Some(read) = registry.get_mut(a) {
            read.loaded = Some((1, 3));
        }
        assert_eq!(registry.get(a).and_then(|r| r.loaded_seq()), Some(&b"CG"[..]));
    }
}
