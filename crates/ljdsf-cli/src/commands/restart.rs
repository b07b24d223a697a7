use crate::cli::{RestartArgs, RestartCommands};
use crate::error::Result;
use crate::report::{self, RestartReport};
use ljdsf::core::io::restart::RestartRecord;
use tracing::info;

pub fn run(args: RestartArgs) -> Result<()> {
    match args.command {
        RestartCommands::Show { path, ntypes, json } => {
            info!("Decoding restart record {:?} for {} atom types", path, ntypes);
            let record = RestartRecord::read_from_path(&path, ntypes)?;
            let report = RestartReport::new(&record, ntypes)?;
            if json {
                println!("{}", report::to_json(&report)?);
            } else {
                print!("{}", report.to_text());
            }
        }
    }
    Ok(())
}
