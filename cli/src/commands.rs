use clap::{Arg, ArgAction, Command};

fn verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Debug mode")
}

fn threads() -> Arg {
    Arg::new("threads")
        .short('t')
        .long("threads")
        .value_name("THREADS")
        .default_value("1")
        .help("number of threads")
}

fn subcommand_assemble() -> Command {
    Command::new("assemble")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Assemble each locus of the JSON batch given from STDIN. Reports go to STDOUT.")
        .arg(verbose())
        .arg(threads())
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("TOML")
                .help("Assembly parameters. Missing keys take their default values."),
        )
        .arg(
            Arg::new("k")
                .short('k')
                .long("k")
                .value_name("K")
                .help("The k-mer size to start with. Overrides the profile."),
        )
        .arg(
            Arg::new("max_k")
                .long("max_k")
                .value_name("K")
                .help("The largest k-mer size. Overrides the profile."),
        )
        .arg(
            Arg::new("dfs_limit")
                .long("dfs_limit")
                .value_name("STEPS")
                .help("Maximum number of search steps per component. Overrides the profile."),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .value_name("DIR")
                .help("Write the graph of each locus into DIR in DOT and FASTA format."),
        )
}

fn subcommand_config() -> Command {
    Command::new("config")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Print the default assembly parameters as a TOML profile.")
}

fn subcommand_pipeline() -> Command {
    Command::new("pipeline")
        .version("0.1")
        .author("BanshoMasutani")
        .about("Run pipeline based on the given TOML file.")
        .arg(
            Arg::new("profile")
                .short('p')
                .value_name("TOML")
                .required(true)
                .help("TOML configuration file, holding the paths and an [assembly] table."),
        )
}

pub fn locasm_parser() -> Command {
    Command::new("locasm")
        .version("0.1")
        .author("Bansho Masutani <ban-m@g.ecc.u-tokyo.ac.jp>")
        .about("Local de Bruijn graph assembler around reference windows")
        .arg_required_else_help(true)
        .subcommand(subcommand_assemble())
        .subcommand(subcommand_config())
        .subcommand(subcommand_pipeline())
}
