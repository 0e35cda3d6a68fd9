//! # scan-orch CLI
//!
//! Command-line interface for the scan orchestrator.
//!
//! ## Usage
//! ```bash
//! scan-orch scan ~/Photos --module duplicates --module large-files
//! scan-orch history list --limit 10
//! ```

mod cli;

use scan_orchestrator::Result;

fn main() -> Result<()> {
    scan_orchestrator::init_tracing();
    cli::run()
}
