use locasm_cli::pipeline;
use microassembler::AssemblyConfig;
use std::io::{BufReader, BufWriter};
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = locasm_cli::commands::locasm_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path: &String = match sub_m.get_one("profile") {
            Some(path) => path,
            None => return Err(std::io::Error::from(std::io::ErrorKind::InvalidInput)),
        };
        let config: pipeline::PipelineConfig = pipeline::read_toml(path)?;
        return pipeline::run_pipeline(&config);
    }
    if let Some(("config", _)) = matches.subcommand() {
        println!("{}", pipeline::default_profile()?);
        return Ok(());
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        let level = match sub_m.get_count("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    match matches.subcommand() {
        Some(("assemble", sub_m)) => assemble(sub_m),
        _ => Ok(()),
    }
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, id: &str) -> Option<T> {
    matches
        .get_one(id)
        .and_then(|e: &String| e.parse::<T>().ok())
}

fn assemble(matches: &clap::ArgMatches) -> std::io::Result<()> {
    debug!("START\tAssemble");
    set_threads(matches);
    let mut config: AssemblyConfig = match matches.get_one::<String>("profile") {
        Some(path) => pipeline::read_toml(path)?,
        None => AssemblyConfig::default(),
    };
    if let Some(k) = parse_arg(matches, "k") {
        config.k = k;
        config.max_k = config.max_k.max(k);
    }
    if let Some(max_k) = parse_arg(matches, "max_k") {
        config.max_k = max_k;
    }
    if let Some(limit) = parse_arg(matches, "dfs_limit") {
        config.dfs_limit = limit;
    }
    let batch = {
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());
        match pipeline::read_batch(reader) {
            Ok(batch) => batch,
            Err(why) => {
                eprintln!("{:?}", why);
                eprintln!("Invalid Input from STDIN.");
                return Err(why);
            }
        }
    };
    let reports = pipeline::assemble(&config, &batch)?;
    if let Some(dir) = matches.get_one::<String>("dump") {
        pipeline::dump_graphs(&config, &batch, &reports, std::path::Path::new(dir))?;
    }
    let stdout = std::io::stdout();
    let wtr = BufWriter::new(stdout.lock());
    pipeline::write_reports(wtr, &reports)
}

fn set_threads(matches: &clap::ArgMatches) {
    if let Some(threads) = parse_arg::<usize>(matches, "threads") {
        debug!("Set Threads\t{}", threads);
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?}", why);
        }
    }
}
