use crate::cli::CheckArgs;
use crate::config::{ProtocolFile, Stage};
use crate::error::{CliError, Result};
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let file = ProtocolFile::load(&args.protocol)?;
    let stages = file.to_stages()?;
    file.simulation.to_params()?;

    if stages.is_empty() {
        return Err(CliError::Config(
            "protocol file declares no stages".to_string(),
        ));
    }
    let needs_target = stages.iter().any(|s| matches!(s, Stage::Shrink(_)));
    if needs_target && file.simulation.target_box.is_none() {
        return Err(CliError::Config(
            "a shrink stage is declared but `simulation.target_box` is not set".to_string(),
        ));
    }

    info!(stages = stages.len(), "protocol file is valid");
    println!("Protocol file is valid: {} stage(s).", stages.len());
    for (i, stage) in stages.iter().enumerate() {
        println!("  [{}] {}", i + 1, stage.name());
    }
    Ok(())
}
