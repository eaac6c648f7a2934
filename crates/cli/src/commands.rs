use clap::{Args, Subcommand};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, default_value = "dwh.json", help = "Config file path (.json, .yaml or .yml)")]
    pub config: String,

    #[arg(long, help = "Load variables from this .env file before reading the config")]
    pub env_file: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, help = "Maximum concurrent statements in parallel phases")]
    pub workers: Option<usize>,

    #[arg(
        long,
        help = "If specified, writes the JSON run report to this file"
    )]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drop and recreate every table of the star schema
    CreateTables {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long, help = "If specified, writes the JSON run report to this file")]
        output: Option<String>,
    },
    /// Load staging tables, then populate dimensions and facts
    Etl {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Reset and load in one go, or run a custom pipeline file
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        run: RunArgs,

        #[arg(long, help = "Pipeline file to run instead of the built-in one")]
        pipeline: Option<String>,
    },
    /// Print a pipeline as JSON without connecting to the warehouse
    Plan {
        #[command(flatten)]
        config: ConfigArgs,

        /// Pipeline to print: "reset", "load" or "full"
        #[arg(long, default_value = "full")]
        kind: String,
    },
    /// Open a connection to the warehouse and run a trivial query
    TestConn {
        #[command(flatten)]
        config: ConfigArgs,
    },
}
