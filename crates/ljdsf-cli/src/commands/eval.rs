use crate::cli::EvalArgs;
use crate::config::PartialSystemConfig;
use crate::error::Result;
use crate::report::{self, EvaluationReport};
use ljdsf::workflows;
use std::path::Path;
use tracing::info;

pub fn run(args: EvalArgs) -> Result<()> {
    let partial_config = PartialSystemConfig::from_file(&args.input)?;
    let base_dir = args.input.parent().unwrap_or(Path::new("."));
    info!("Merging system description from file and CLI arguments...");
    let system = partial_config.merge_with_cli(&args, base_dir)?;

    info!("Invoking the evaluation workflow...");
    let evaluation = workflows::evaluate::run(&system)?;

    let report = EvaluationReport::new(&evaluation, args.forces);
    if args.json {
        println!("{}", report::to_json(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    if let Some(path) = &args.write_restart {
        info!("Writing restart record to {:?}", path);
        evaluation.style.restart_record().write_to_path(path)?;
        println!("Restart record written to: {}", path.display());
    }

    Ok(())
}
