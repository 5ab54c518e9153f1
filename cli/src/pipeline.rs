//! Pipeline: assemble every locus of a batch file according to a TOML profile.
use definitions::{LocusBatch, LocusReport, LocusStatus};
use microassembler::locus::assemble_loci;
use microassembler::{AssemblyConfig, Graph};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// The configuration of the pipeline.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    /// The path to the JSON batch of loci.
    pub input_file: PathBuf,
    /// The path to the output directory.
    pub out_dir: PathBuf,
    pub prefix: String,
    #[serde(default)]
    pub verbose: usize,
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Dump the graph of each locus in DOT and FASTA format.
    #[serde(default)]
    pub dump_graphs: bool,
    #[serde(default)]
    pub assembly: AssemblyConfig,
}

fn default_threads() -> usize {
    1
}

fn invalid_data<E: std::fmt::Display>(why: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, why.to_string())
}

/// Read a TOML file and deserialize it.
pub fn read_toml<T: serde::de::DeserializeOwned, P: AsRef<Path>>(path: P) -> std::io::Result<T> {
    let mut rdr = std::fs::File::open(path.as_ref()).map(BufReader::new)?;
    let mut file = String::new();
    rdr.read_to_string(&mut file)?;
    toml::from_str(&file).map_err(invalid_data)
}

pub fn default_profile() -> std::io::Result<String> {
    toml::to_string(&AssemblyConfig::default()).map_err(invalid_data)
}

pub fn read_batch<R: Read>(rdr: R) -> std::io::Result<LocusBatch> {
    Ok(serde_json::de::from_reader(rdr)?)
}

pub fn write_reports<W: Write>(wtr: W, reports: &[LocusReport]) -> std::io::Result<()> {
    Ok(serde_json::ser::to_writer(wtr, reports)?)
}

/// Assemble the loci and log a one-line summary of each report.
pub fn assemble(config: &AssemblyConfig, batch: &LocusBatch) -> std::io::Result<Vec<LocusReport>> {
    config.validate().map_err(invalid_data)?;
    debug!("START\tAssemble\t{}", batch.loci.len());
    let reports = assemble_loci(config, batch);
    for report in reports.iter() {
        let edits: usize = report.paths.iter().map(|p| p.edits.len()).sum();
        debug!(
            "REPORT\t{}\t{}\t{:?}\t{}\t{}",
            report.name,
            report.k,
            report.status,
            report.paths.len(),
            edits
        );
    }
    Ok(reports)
}

/// Rebuild the graph of each assembled locus with its final k and write it into `dir`.
pub fn dump_graphs(
    config: &AssemblyConfig,
    batch: &LocusBatch,
    reports: &[LocusReport],
    dir: &Path,
) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for (locus, report) in batch.loci.iter().zip(reports.iter()) {
        if matches!(report.status, LocusStatus::Failed(_) | LocusStatus::Repetitive) {
            continue;
        }
        let mut graph = Graph::new(&config.with_k(report.k));
        if let Err(why) = graph.build_graph(&locus.reference, &locus.reads) {
            warn!("DUMP\t{}\t{}", report.name, why);
            continue;
        }
        let stem = dir.join(&report.name);
        let dot = std::fs::File::create(stem.with_extension("dot")).map(BufWriter::new)?;
        graph.write_dot(dot)?;
        let fasta = std::fs::File::create(stem.with_extension("fa")).map(BufWriter::new)?;
        graph.write_fasta(fasta)?;
        let pairs = std::fs::File::create(stem.with_extension("pairs.tsv")).map(BufWriter::new)?;
        graph.write_pairs(pairs)?;
    }
    Ok(())
}

pub fn run_pipeline(config: &PipelineConfig) -> std::io::Result<()> {
    let PipelineConfig {
        input_file,
        out_dir,
        prefix,
        verbose,
        threads,
        dump_graphs: to_dump,
        assembly,
    } = config.clone();
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?}", why);
    }
    std::fs::create_dir_all(&out_dir)?;
    let file_stem = out_dir.join(prefix);
    debug!("Opening {:?}", input_file);
    let batch = std::fs::File::open(&input_file)
        .map(BufReader::new)
        .and_then(read_batch)?;
    let reports = assemble(&assembly, &batch)?;
    let wtr = std::fs::File::create(file_stem.with_extension("json")).map(BufWriter::new)?;
    write_reports(wtr, &reports)?;
    if to_dump {
        dump_graphs(&assembly, &batch, &reports, &file_stem.with_extension("graphs"))?;
    }
    Ok(())
}
