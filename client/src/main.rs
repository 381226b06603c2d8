//! dbc-case-study-cli: inspect case study accounts offline
//!
//! JSON goes to stdout, diagnostics to stderr (`RUST_LOG` controls verbosity).

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dbc_case_study_client::{
    case_study::{
        compute_eligibility, decode_with, validate_submission, DisplayStatus, Pubkey,
        MAX_CID_LEN,
    },
    ensure_token_creatable_by, render_eligibility, render_gallery, render_layout, render_record,
    ClientConfig, Gallery, GalleryQuery, SizeFilter, StaticAccountSource,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dbc-case-study-cli")]
#[command(about = "Decode and inspect Dallas Buyers Club case study accounts")]
struct Cli {
    /// JSON client configuration file
    #[arg(short, long, env = "DBC_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster name (overrides config file)
    #[arg(long, env = "DBC_CLUSTER")]
    cluster: Option<String>,

    /// Require the CaseStudy account discriminator (overrides config file)
    #[arg(long, env = "DBC_STRICT_DISCRIMINATOR")]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one account and print the record with its derived state
    Decode {
        #[command(flatten)]
        input: AccountInput,

        /// Account address, echoed in the output
        #[arg(long)]
        address: Option<Pubkey>,

        /// Connected identity, for ownership
        #[arg(long, env = "DBC_VIEWER")]
        viewer: Option<Pubkey>,
    },

    /// Report attention token eligibility for one account
    Eligibility {
        #[command(flatten)]
        input: AccountInput,

        #[arg(long)]
        min_reputation_score: Option<u8>,

        #[arg(long)]
        min_validator_count: Option<u32>,

        /// Fail unless this signer may create the token now
        #[arg(long)]
        signer: Option<Pubkey>,
    },

    /// Decode every account in a snapshot, newest first
    Gallery {
        /// JSON snapshot: [{ "address": "<base58>", "data": "<base64>" }]
        #[arg(long, env = "DBC_SNAPSHOT")]
        snapshot: PathBuf,

        #[arg(long, env = "DBC_VIEWER")]
        viewer: Option<Pubkey>,

        /// Only records submitted by --viewer
        #[arg(long, requires = "viewer")]
        mine: bool,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only records eligible for an attention token
        #[arg(long)]
        eligible: bool,

        /// Only records still open for validation
        #[arg(long)]
        active: bool,

        /// Only accounts of exactly this many bytes
        #[arg(long)]
        data_size: Option<usize>,
    },

    /// Print the account layout for a CID length
    Layout {
        #[arg(long, default_value_t = 46)]
        cid_len: usize,

        #[arg(long)]
        with_token: bool,
    },
}

#[derive(Args)]
struct AccountInput {
    /// Account data as base64 (read from stdin when neither source is given)
    #[arg(long, conflicts_with = "file")]
    data: Option<String>,

    /// File holding the raw account bytes
    #[arg(long)]
    file: Option<PathBuf>,
}

impl AccountInput {
    fn read(&self) -> anyhow::Result<Vec<u8>> {
        if let Some(path) = &self.file {
            return std::fs::read(path)
                .with_context(|| format!("failed to read account file {}", path.display()));
        }
        let encoded = match &self.data {
            Some(data) => data.clone(),
            None => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("failed to read stdin")?;
                input
            }
        };
        STANDARD
            .decode(encoded.trim())
            .context("account data is not valid base64")
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for DisplayStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => DisplayStatus::Pending,
            StatusArg::Approved => DisplayStatus::Approved,
            StatusArg::Rejected => DisplayStatus::Rejected,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.cluster, cli.strict)?;
    let deployment = config.deployment()?;
    info!(cluster = deployment.cluster, program_id = deployment.program_id, "using deployment");

    let output = match cli.command {
        Command::Decode {
            input,
            address,
            viewer,
        } => {
            let data = input.read()?;
            let record = decode_with(&data, &config.decode_options())
                .context("failed to decode case study account")?;
            if let Err(err) = validate_submission(&record) {
                warn!(%err, "record would not pass submission checks");
            }
            render_record(address.as_ref(), &record, viewer.as_ref(), &config)?
        }

        Command::Eligibility {
            input,
            min_reputation_score,
            min_validator_count,
            signer,
        } => {
            let mut thresholds = config.thresholds;
            if let Some(score) = min_reputation_score {
                thresholds.min_reputation_score = score;
            }
            if let Some(count) = min_validator_count {
                thresholds.min_validator_count = count;
            }

            let data = input.read()?;
            let record = decode_with(&data, &config.decode_options())
                .context("failed to decode case study account")?;
            let result = compute_eligibility(&record, &thresholds);
            println!("{}", render_eligibility(&result)?);

            if let Some(signer) = signer {
                ensure_token_creatable_by(&record, &signer, &thresholds)
                    .context("attention token cannot be created")?;
            }
            return Ok(());
        }

        Command::Gallery {
            snapshot,
            viewer,
            mine,
            status,
            eligible,
            active,
            data_size,
        } => {
            let program_id = deployment.program_id()?;
            let source = StaticAccountSource::load(program_id, &snapshot)?;
            let filter = data_size.map_or(SizeFilter::Any, SizeFilter::DataSize);
            let gallery = Gallery::fetch(&source, &program_id, filter, &config.decode_options())?;
            if !gallery.skipped().is_empty() {
                warn!(
                    skipped = gallery.skipped().len(),
                    decoded = gallery.len(),
                    "some accounts could not be decoded"
                );
            }

            let query = GalleryQuery {
                owner: if mine { viewer } else { None },
                status: status.map(DisplayStatus::from),
                eligible_for_token: eligible.then_some(config.thresholds),
                active_only: active,
            };
            render_gallery(&gallery, gallery.select(&query), viewer.as_ref(), &config)?
        }

        Command::Layout {
            cid_len,
            with_token,
        } => {
            if cid_len == 0 || cid_len > MAX_CID_LEN {
                bail!("cid length must be within 1..={MAX_CID_LEN}, got {cid_len}");
            }
            render_layout(cid_len, with_token)?
        }
    };

    println!("{output}");
    Ok(())
}

fn load_config(
    path: Option<&Path>,
    cluster: Option<String>,
    strict: bool,
) -> anyhow::Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path)?,
        None => {
            debug!("no config file given, using defaults");
            ClientConfig::default()
        }
    };
    if let Some(cluster) = cluster {
        config.cluster = cluster;
    }
    if strict {
        config.strict_discriminator = true;
    }
    Ok(config)
}
