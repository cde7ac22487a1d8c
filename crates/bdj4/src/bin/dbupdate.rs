//! The `dbupdate` process: walks the music directory and rebuilds or
//! refreshes the song database.
//!
//! The tag-reader collaborator (`dbtag`) is out of scope for this
//! repository, so every `DB_FILE_CHK` this binary would send is answered
//! locally as "no tag data" rather than over a real bus connection. The
//! pipeline itself (`bdj_dbupdate::DbUpdatePipeline`) doesn't know or care
//! where replies come from, so wiring a real collaborator back in later is
//! a matter of feeding `record_tag_result` from the bus instead of inline.

use anyhow::{bail, Context, Result};
use bdj4::{init_logging, BaseArgs};
use bdj_config::BdjConfig;
use bdj_dbupdate::{DbUpdatePipeline, StepOutcome};
use clap::Parser;
use std::collections::HashSet;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Walks the music library and refreshes the song database")]
struct Cli {
    #[command(flatten)]
    base: BaseArgs,

    /// Rebuild the database from scratch instead of refreshing it in place.
    #[arg(long)]
    rebuild: bool,

    /// Skip files already present in the live database.
    #[arg(long)]
    checknew: bool,

    /// Emit `PROG <fraction>` lines on stdout.
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("dbupdate", cli.base.debug);

    let config = BdjConfig::load().context("failed to load configuration")?;
    let live_db_path = config.infra.paths.data_top_dir.join("data").join("musicdb.dat");

    let mut pipeline = DbUpdatePipeline::new(
        &config.infra.paths.music_dir,
        &live_db_path,
        cli.rebuild,
        cli.checknew,
        HashSet::new(),
    );
    pipeline.prep().context("failed to walk the music directory")?;

    loop {
        match pipeline.step() {
            StepOutcome::SendChecks(batch) => {
                for _ in &batch {
                    pipeline.record_tag_result(None);
                }
            }
            StepOutcome::Idle => {}
            StepOutcome::Progress(fraction) => {
                if cli.progress {
                    println!("PROG {fraction:.1}");
                }
            }
            StepOutcome::Finished(counters) => {
                if cli.progress {
                    println!("PROG 1.0");
                    println!("END");
                }
                info!(?counters, "database update finished");
                break;
            }
            StepOutcome::SealFailed(message) => {
                bail!("rebuild finished but the new database could not be published: {message}");
            }
        }
    }

    Ok(())
}
