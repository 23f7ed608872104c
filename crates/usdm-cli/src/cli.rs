use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "usdm-check",
    about = "Identity, reference and linked-list integrity checks for USDM study definitions",
    version
)]
pub struct Cli {
    /// Debug logging on stderr (USDM_CHECK_LOG still takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a study document and print the report
    Validate {
        /// Path to the USDM JSON document
        #[arg(long)]
        input: String,

        /// Path to a TOML study profile (built-in v4 profile when omitted)
        #[arg(long)]
        profile: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this path
        #[arg(long)]
        json_output: Option<String>,
    },

    /// Print every ordered collection as reconstructed from previousId/nextId
    Order {
        /// Path to the USDM JSON document
        #[arg(long)]
        input: String,

        /// Restrict output to collections with this field name (e.g. `epochs`)
        #[arg(long)]
        collection: Option<String>,

        /// Path to a TOML study profile
        #[arg(long)]
        profile: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print eligibility criterion text of every design, in list order
    Criteria {
        /// Path to the USDM JSON document
        #[arg(long)]
        input: String,

        /// Path to a TOML study profile
        #[arg(long)]
        profile: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
