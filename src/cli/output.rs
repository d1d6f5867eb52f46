use anyhow::Result;
use serde::Serialize;

use selector_heal_cli::report::{render, HumanReadable};
use selector_heal_cli::OutputFormat;

pub fn print_report<T>(format: OutputFormat, report: &T) -> Result<()>
where
    T: Serialize + HumanReadable,
{
    let rendered = render(format, report)?;
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}
