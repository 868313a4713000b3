use crate::preview::SortBy;
use clap::{ArgAction, Args, Parser, Subcommand};
use debrother_config::Settings;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "debrother", version, about = "Re-order and rename duplex scanner output", long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Settings file (defaults to the platform configuration directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Do not write the effective settings back on exit
    #[arg(long, global = true)]
    pub no_save: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the planned page order and names without touching any file
    Preview {
        #[command(flatten)]
        job: JobArgs,
        /// Column to order the table by
        #[arg(long, value_enum, default_value_t = SortBy::Index)]
        sort_by: SortBy,
    },
    /// Rename the batch as a single all-or-nothing operation
    Rename {
        #[command(flatten)]
        job: JobArgs,
        /// Remove the original files once every renamed file is in place
        #[arg(long, overrides_with = "keep_originals")]
        delete_originals: bool,
        #[arg(long, overrides_with = "delete_originals")]
        keep_originals: bool,
        /// Go through the whole transaction without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a naming template and show sample renderings
    Check {
        template: String,
    },
    /// Describe the placeholders a naming template can use
    Placeholders,
}

/// Options shared by every command that works on a batch. Anything left unset
/// keeps its value from the settings file.
#[derive(Debug, Default, Args)]
pub struct JobArgs {
    /// Directory holding the scanned files
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,
    /// Directory receiving the renamed files (defaults to the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Naming template, e.g. `{yyyy}-{mm:02d}/{page:03d}.{ext}`
    #[arg(short, long, value_name = "TEMPLATE")]
    pub pattern: Option<String>,
    /// Sort by the scanner's page suffix
    #[arg(long, overrides_with = "no_numbering")]
    pub numbering: bool,
    #[arg(long, overrides_with = "numbering")]
    pub no_numbering: bool,
    /// Swap every pair of pages
    #[arg(long, overrides_with = "no_flip")]
    pub flip: bool,
    #[arg(long, overrides_with = "flip")]
    pub no_flip: bool,
    /// The verso pages were scanned back to front
    #[arg(long, overrides_with = "no_backward_verso")]
    pub backward_verso: bool,
    #[arg(long, overrides_with = "backward_verso")]
    pub no_backward_verso: bool,
}
impl JobArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output = Some(output.clone());
        }
        if let Some(pattern) = &self.pattern {
            settings.pattern = pattern.clone();
        }
        toggle(&mut settings.numbering, self.numbering, self.no_numbering);
        toggle(&mut settings.flip, self.flip, self.no_flip);
        toggle(&mut settings.backward_verso, self.backward_verso, self.no_backward_verso);
    }
}

/// `--flag` / `--no-flag` pairs; the last one given wins (clap resets the
/// other), neither keeps the current value.
pub fn toggle(value: &mut bool, on: bool, off: bool) {
    if on {
        *value = true;
    } else if off {
        *value = false;
    }
}
