//! Assembling one locus: pick a k-mer size, build the graph, enumerate and align the walks.
use crate::align::{global_cov_align_aff, window, EndMode};
use crate::config::AssemblyConfig;
use crate::error::AssemblyError;
use crate::graph::{Graph, SearchStatus};
use crate::mer::{is_almost_repeat, is_repeat, Ori};
use crate::transcript::{EditContext, Transcript};
use definitions::{LocusBatch, LocusInput, LocusReport, LocusStatus, PathReport};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct LocusAssembler<'a> {
    config: &'a AssemblyConfig,
}

impl<'a> LocusAssembler<'a> {
    pub fn new(config: &'a AssemblyConfig) -> Self {
        Self { config }
    }
    /// Never fails: an error is turned into a report with [LocusStatus::Failed].
    pub fn assemble(&self, locus: &LocusInput) -> LocusReport {
        let name = &locus.reference.name;
        match self.try_assemble(locus) {
            Ok(report) => report,
            Err(why) => {
                warn!("FAILED\t{}\t{}", name, why);
                LocusReport::failed(name, self.config.k, why.to_string())
            }
        }
    }
    fn try_assemble(&self, locus: &LocusInput) -> Result<LocusReport, AssemblyError> {
        self.config.validate()?;
        let reference = &locus.reference;
        if reference.len() < self.config.k {
            return Err(AssemblyError::ReferenceTooShort {
                len: reference.len(),
                k: self.config.k,
            });
        }
        let ref_seq = reference.seq().to_ascii_uppercase();
        let mut last = None;
        for k in self.config.k_values() {
            let is_last = self.config.max_k < k + self.config.k_step.max(1);
            if reference.len() < k {
                break;
            }
            if is_repeat(&ref_seq, k) || is_almost_repeat(&ref_seq, k, self.config.max_mismatch) {
                debug!("REPEATREF\t{}\t{}", reference.name, k);
                continue;
            }
            let config = self.config.with_k(k);
            let mut graph = Graph::new(&config);
            let components = graph.build_graph(reference, &locus.reads)?;
            last = Some((k, components, *graph.counters()));
            if graph.has_repeats_in_graph_paths() {
                continue;
            }
            let cyclic = (1..=components)
                .any(|comp| graph.mark_ref_ends(comp).is_some() && graph.has_cycle());
            if cyclic && !is_last {
                debug!("CYCLIC\t{}\t{}", reference.name, k);
                continue;
            }
            return enumerate_paths(&mut graph, components);
        }
        let fallback = (self.config.max_k, 0, Default::default());
        let (k, components, counters) = last.unwrap_or(fallback);
        warn!("REPETITIVE\t{}\t{}", reference.name, k);
        Ok(LocusReport {
            name: reference.name.clone(),
            k,
            status: LocusStatus::Repetitive,
            components,
            counters,
            paths: vec![],
            scaffolds: vec![],
        })
    }
}

/// Walk every component having reference anchors and align each walk to the reference.
fn enumerate_paths(graph: &mut Graph, components: usize) -> Result<LocusReport, AssemblyError> {
    let ref_cov = graph.reference_coverage();
    let ref_seq = graph.reference().to_vec();
    let tandem = graph.config().tandem_params();
    let align_params = graph.config().align;
    let min_thread_reads = graph.config().min_thread_reads;
    let k = graph.k();
    let mut status = LocusStatus::Complete;
    let mut paths = vec![];
    for comp in graph.component_order(components) {
        let (source, sink) = match graph.mark_ref_ends(comp) {
            Some(ends) => ends,
            None => continue,
        };
        graph.thread_reads(comp);
        let (start, end) = (source.ref_pos, sink.ref_pos + k);
        let ref_window = window(&ref_seq, start, end)?;
        let window_cov = ref_cov.get(start..end).unwrap_or(&[]);
        let ref_start = graph.ref_start() + start as u64;
        let name = graph.ref_name().to_string();
        let graph = &*graph;
        let search = graph.dfs(Ori::F, |mut path| {
            if path.min_read_support() < min_thread_reads {
                trace!("UNSUPPORTED\t{}\t{:?}", name, path);
                return;
            }
            let seq = path.sequence();
            let cov = path.coverage(false);
            let mode = EndMode::FreeTargetEnds;
            let aln = match global_cov_align_aff(ref_window, &seq, &cov, mode, &align_params) {
                Ok(aln) => aln,
                Err(why) => {
                    warn!("ALIGN\t{}\t{}\t{}", name, comp, why);
                    return;
                }
            };
            let ctx = EditContext {
                ref_seq: ref_window,
                ref_start,
                path_seq: &seq,
                col_cov: &aln.cov,
                ref_cov: window_cov,
                tandem: &tandem,
            };
            let transcript = Transcript::from_alignment(&aln.alignment, &ctx);
            path.set_counts(&transcript);
            debug!("PATH\t{}\t{}\t{:?}\t{}", name, comp, path, transcript.edits.len());
            paths.push(PathReport {
                component: comp,
                sequence: String::from_utf8_lossy(&path.forward_sequence()).to_string(),
                coverage: path.forward_coverage(false),
                edits: transcript.edits,
                match_bp: path.match_bp,
                snp_bp: path.snp_bp,
                ins_bp: path.ins_bp,
                del_bp: path.del_bp,
                has_cycle: path.has_cycle,
                touches_only_tumor: path.has_tumor_only_node(),
            });
        })?;
        if search == SearchStatus::Truncated {
            status = LocusStatus::Truncated;
        }
    }
    debug!("LOCUS\t{}\t{}\t{}\t{}", graph.ref_name(), k, components, paths.len());
    Ok(LocusReport {
        name: graph.ref_name().to_string(),
        k,
        status,
        components,
        counters: *graph.counters(),
        paths,
        scaffolds: graph.scaffolds().to_vec(),
    })
}

/// Assemble every locus of the batch in parallel. The reports keep the order of the batch.
pub fn assemble_loci(config: &AssemblyConfig, batch: &LocusBatch) -> Vec<LocusReport> {
    let assembler = LocusAssembler::new(config);
    batch
        .loci
        .par_iter()
        .map(|locus| assembler.assemble(locus))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_test::tests::{random_reference, test_config};
    use definitions::{EditCode, ReadRecord, ReferenceWindow, Sample, Strand};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn repetitive_reference_escalates_k() {
        let config = AssemblyConfig {
            k: 5,
            max_k: 9,
            ..test_config()
        };
        let locus = LocusInput {
            reference: ReferenceWindow::new("rep", 100, "ACGTACGTAC"),
            reads: vec![],
        };
        let report = LocusAssembler::new(&config).assemble(&locus);
        assert_eq!(report.status, LocusStatus::Complete);
        assert_eq!(report.k, 9);
        assert_eq!(report.paths.len(), 1);
        assert_eq!(report.paths[0].sequence, "ACGTACGTAC");
        assert!(report.paths[0].edits.is_empty());
    }
    #[test]
    fn always_repetitive() {
        let config = AssemblyConfig {
            k: 5,
            max_k: 7,
            ..test_config()
        };
        let locus = LocusInput {
            reference: ReferenceWindow::new("rep", 0, "ACGTACGTACGTACGT"),
            reads: vec![],
        };
        let report = LocusAssembler::new(&config).assemble(&locus);
        assert_eq!(report.status, LocusStatus::Repetitive);
        assert!(report.paths.is_empty());
    }
    #[test]
    fn failures_are_reported() {
        let config = test_config();
        let locus = LocusInput {
            reference: ReferenceWindow::new("short", 0, "ACGT"),
            reads: vec![],
        };
        let report = LocusAssembler::new(&config).assemble(&locus);
        assert!(matches!(report.status, LocusStatus::Failed(_)));
        let config = AssemblyConfig { k: 2, ..test_config() };
        let locus = LocusInput {
            reference: ReferenceWindow::new("bad", 0, "ACGTTGCAAGCT"),
            reads: vec![],
        };
        let report = LocusAssembler::new(&config).assemble(&locus);
        assert!(matches!(report.status, LocusStatus::Failed(_)));
    }
    fn snp_locus(seed: u64) -> (Vec<u8>, LocusInput) {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let config = test_config();
        let refr = random_reference(&mut rng, 100, config.k);
        let mut alt = refr.clone();
        alt[30] = match refr[30] {
            b'A' => b'C',
            b'C' => b'G',
            b'G' => b'T',
            _ => b'A',
        };
        let mut reads = vec![];
        for i in 0..3 {
            let name = format!("tumor{}", i);
            let seq = String::from_utf8_lossy(&alt).to_string();
            reads.push(ReadRecord::new(&name, &seq, Sample::Tumor, Strand::Forward));
            let name = format!("normal{}", i);
            let seq = String::from_utf8_lossy(&refr).to_string();
            reads.push(ReadRecord::new(&name, &seq, Sample::Normal, Strand::Reverse));
        }
        let reference = ReferenceWindow::new("snp", 1000, &String::from_utf8_lossy(&refr));
        (alt, LocusInput { reference, reads })
    }
    #[test]
    fn somatic_snp() {
        let config = test_config();
        for seed in 0..5 {
            let (alt, locus) = snp_locus(seed);
            let report = LocusAssembler::new(&config).assemble(&locus);
            assert_eq!(report.status, LocusStatus::Complete);
            assert_eq!(report.k, config.k);
            assert_eq!(report.components, 1);
            assert_eq!(report.paths.len(), 2);
            let (with_edit, without): (Vec<_>, Vec<_>) =
                report.paths.iter().partition(|p| !p.edits.is_empty());
            assert_eq!(with_edit.len(), 1);
            assert_eq!(without[0].sequence, locus.reference.seq);
            assert!(!without[0].touches_only_tumor);
            let path = with_edit[0];
            assert_eq!(path.sequence.as_bytes(), alt.as_slice());
            assert!(path.touches_only_tumor);
            assert_eq!(path.edits.len(), 1);
            assert_eq!(path.edits[0].code, EditCode::Snp);
            assert_eq!(path.edits[0].ref_pos, 1030);
            assert_eq!(path.snp_bp, 1);
            // Three reads, each counted by the eleven k-mers over the SNP.
            assert_eq!(path.edits[0].alt_coverage.tumor_fwd.min, 33);
        }
    }
    fn to_string(seq: &[u8]) -> String {
        String::from_utf8_lossy(seq).to_string()
    }
    #[test]
    fn dropped_reads_do_not_support_paths() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(21);
        let refr = random_reference(&mut rng, 100, 11);
        let mut alt = refr.clone();
        alt[30] = if refr[30] == b'A' { b'C' } else { b'A' };
        let mut reads: Vec<_> = (0..3)
            .map(|i| {
                let name = format!("normal{}", i);
                ReadRecord::new(&name, &to_string(&refr), Sample::Normal, Strand::Forward)
            })
            .collect();
        reads.push(ReadRecord::new("tumor", &to_string(&alt), Sample::Tumor, Strand::Forward));
        let mut ambiguous = alt.clone();
        ambiguous[60..66].iter_mut().for_each(|b| *b = b'N');
        for i in 0..2 {
            let name = format!("ambiguous{}", i);
            let seq = to_string(&ambiguous);
            reads.push(ReadRecord::new(&name, &seq, Sample::Tumor, Strand::Forward));
        }
        let reference = ReferenceWindow::new("dropped", 0, &to_string(&refr));
        let locus = LocusInput { reference, reads };
        let supported = |min_thread_reads: usize| {
            let config = AssemblyConfig {
                min_thread_reads,
                ..test_config()
            };
            LocusAssembler::new(&config).assemble(&locus)
        };
        let report = supported(0);
        assert_eq!(report.counters.reads_ambiguous, 2);
        assert_eq!(report.counters.reads_loaded, 4);
        assert_eq!(report.paths.len(), 2);
        // The alt path is backed by the single loaded tumor read.
        let report = supported(2);
        assert_eq!(report.status, LocusStatus::Complete);
        assert_eq!(report.paths.len(), 1);
        assert_eq!(report.paths[0].sequence, locus.reference.seq);
        assert!(report.paths[0].edits.is_empty());
        let report = supported(4);
        assert_eq!(report.status, LocusStatus::Complete);
        assert!(report.paths.is_empty());
    }
    #[test]
    fn paths_follow_scaffolds() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(22);
        let segments: Vec<_> = (0..3).map(|_| random_reference(&mut rng, 60, 11)).collect();
        let gap = vec![b'N'; 15];
        let pieces = [&segments[0], &gap, &segments[1], &gap, &segments[2]];
        let refr: Vec<u8> = pieces.iter().flat_map(|x| x.iter()).copied().collect();
        let reference = ReferenceWindow::new("gapped", 0, &to_string(&refr));
        let mut reads = vec![];
        let mut pair = |name: &str, first: &[u8], second: &[u8]| {
            let (first, second) = (to_string(first), to_string(second));
            let mut mate1 = ReadRecord::new(name, &first, Sample::Tumor, Strand::Forward);
            mate1.mate_order = 1;
            let mut mate2 = ReadRecord::new(name, &second, Sample::Tumor, Strand::Reverse);
            mate2.mate_order = 2;
            reads.push(mate1);
            reads.push(mate2);
        };
        pair("ac0", &segments[0][10..40], &segments[2][20..50]);
        pair("ac1", &segments[0][12..42], &segments[2][22..52]);
        pair("cb0", &segments[2][5..35], &segments[1][15..45]);
        let config = AssemblyConfig {
            scaffold_contigs: true,
            ..test_config()
        };
        let mut graph = Graph::new(&config);
        let components = graph.build_graph(&reference, &reads).unwrap();
        assert_eq!(components, 3);
        let report = enumerate_paths(&mut graph, components).unwrap();
        assert_eq!(report.scaffolds, vec![vec![1, 3, 2]]);
        let order: Vec<_> = report.paths.iter().map(|p| p.component).collect();
        assert_eq!(order, vec![1, 3, 2]);
        let seqs: Vec<_> = report.paths.iter().map(|p| p.sequence.as_bytes()).collect();
        let expected = [&segments[0], &segments[2], &segments[1]];
        assert!(std::iter::zip(seqs, expected).all(|(x, y)| x == y.as_slice()));
        let mut graph = Graph::new(&test_config());
        let components = graph.build_graph(&reference, &reads).unwrap();
        let report = enumerate_paths(&mut graph, components).unwrap();
        assert!(report.scaffolds.is_empty());
        let order: Vec<_> = report.paths.iter().map(|p| p.component).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
    #[test]
    fn batch_keeps_order() {
        let config = test_config();
        let batch = LocusBatch {
            loci: (0..4).map(|seed| snp_locus(seed).1).collect(),
        };
        let reports = assemble_loci(&config, &batch);
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.paths.len() == 2));
    }
}
