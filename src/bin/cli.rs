//! rosterdb CLI
//!
//! One-shot command-line front end over a record file.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rosterdb::service::{Logged, Timed};
use rosterdb::{
    Assignment, Config, Engine, Predicate, Record, RecordService, Result, RosterError, Snapshot,
    SyncStrategy,
};
use tracing_subscriber::{fmt, EnvFilter};

/// rosterdb CLI
#[derive(Parser, Debug)]
#[command(name = "rosterdb-cli")]
#[command(about = "CLI for the rosterdb personnel record store")]
#[command(version)]
struct Args {
    /// Record file
    #[arg(short, long, default_value = "./roster.db")]
    file: PathBuf,

    /// Skip fsync after each mutation
    #[arg(long)]
    buffered: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a record (id is assigned when omitted)
    Add {
        #[arg(long, default_value_t = 0)]
        id: i32,

        #[command(flatten)]
        fields: RecordFields,
    },

    /// Insert a record under its id, keeping id order
    Insert {
        id: i32,

        #[command(flatten)]
        fields: RecordFields,
    },

    /// Print all live records
    List,

    /// Print records whose attribute equals a value
    Find { attribute: String, value: String },

    /// Delete records whose attribute equals a value
    Delete { attribute: String, value: String },

    /// Edit records: --set attr=value ... [--where attr=value ...]
    Update {
        #[arg(long = "set", value_parser = parse_pair, required = true)]
        set: Vec<(String, String)>,

        #[arg(long = "where", value_parser = parse_pair)]
        filter: Vec<(String, String)>,
    },

    /// Reclaim space held by deleted records
    Purge,

    /// Print live and deleted record counts
    Stat,

    /// Write all live records to a snapshot file
    Snapshot { output: PathBuf },

    /// Merge a snapshot file into the store
    Restore { input: PathBuf },
}

#[derive(ClapArgs, Debug)]
struct RecordFields {
    first_name: String,
    last_name: String,

    /// YYYY-MM-DD
    birth_date: String,

    experience: i16,

    /// e.g. 2500 or 2500.50
    salary: String,

    /// Single grade letter
    rank: String,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rosterdb=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_path(&args.file)
        .sync_strategy(if args.buffered {
            SyncStrategy::OsBuffered
        } else {
            SyncStrategy::EveryWrite
        })
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.file.display(), e);
            process::exit(1);
        }
    };

    let mut service = Timed::new(Logged::new(engine));
    if let Err(e) = run(args.command, &mut service) {
        tracing::error!("{}", e);
        process::exit(1);
    }

    for (operation, timing) in service.timings() {
        tracing::debug!("{}: {} calls in {:?}", operation, timing.calls, timing.total);
    }

    if let Err(e) = service.into_inner().into_inner().close() {
        tracing::error!("Failed to close store: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands, service: &mut impl RecordService) -> Result<()> {
    match command {
        Commands::Add { id, fields } => {
            let id = service.create(fields.into_record(id)?)?;
            println!("created {}", id);
        }
        Commands::Insert { id, fields } => {
            service.insert_with_id(fields.into_record(id)?)?;
            println!("inserted {}", id);
        }
        Commands::List => {
            for record in service.read_all()? {
                println!("{}", record?);
            }
        }
        Commands::Find { attribute, value } => {
            let predicate = Predicate::parse(&attribute, &value)?;
            for record in service.find_by_attribute(predicate.attribute(), predicate.value())? {
                println!("{}", record);
            }
        }
        Commands::Delete { attribute, value } => {
            let predicate = Predicate::parse(&attribute, &value)?;
            for outcome in service.delete(&predicate)? {
                match outcome {
                    Ok(id) => println!("deleted {}", id),
                    Err(e) => println!("skipped: {}", e),
                }
            }
        }
        Commands::Update { set, filter } => {
            let edits = set
                .iter()
                .map(|(a, v)| Assignment::parse(a, v))
                .collect::<Result<Vec<_>>>()?;
            let predicates = filter
                .iter()
                .map(|(a, v)| Predicate::parse(a, v))
                .collect::<Result<Vec<_>>>()?;

            for outcome in service.update(&predicates, &edits)? {
                match outcome {
                    Ok(id) => println!("updated {}", id),
                    Err(e) => println!("skipped: {}", e),
                }
            }
        }
        Commands::Purge => {
            service.purge()?;
            println!("{}", service.stats());
        }
        Commands::Stat => {
            println!("{}", service.stats());
        }
        Commands::Snapshot { output } => {
            let snapshot = Snapshot::capture(&*service)?;
            snapshot.save(&output)?;
            println!("saved {} records to {}", snapshot.len(), output.display());
        }
        Commands::Restore { input } => {
            let snapshot = Snapshot::load(&input)?;
            let summary = service.restore(snapshot.into_records())?;
            println!(
                "updated {}, appended {}, rejected {}",
                summary.updated,
                summary.appended,
                summary.rejected.len()
            );
        }
    }

    Ok(())
}

impl RecordFields {
    fn into_record(self, id: i32) -> Result<Record> {
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d").map_err(|_| {
            RosterError::InvalidAttribute(format!("'{}' is not a valid date", self.birth_date))
        })?;

        Ok(Record::new(
            id,
            self.first_name,
            self.last_name,
            birth_date,
            self.experience,
            self.salary.parse()?,
            self.rank.parse()?,
        ))
    }
}

/// Parse `attr=value`
fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(a, v)| (a.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected attr=value, got '{}'", s))
}
