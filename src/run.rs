mod cli;

pub(crate) use cli::as_cli;

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::{Config, ConfigManager};
use crate::session::Session;

/// Everything a command handler may touch.
pub(crate) struct Context {
    pub(crate) session: Session,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
}

/// Pull `--as-of YYYY-MM-DD` out of the argument list, wherever it appears.
pub(crate) fn split_as_of(args: &[String]) -> Result<(Option<NaiveDate>, Vec<String>)> {
    let mut as_of = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--as-of" {
            let Some(value) = iter.next() else {
                anyhow::bail!("--as-of needs a date (YYYY-MM-DD)");
            };
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid --as-of date '{value}', expected YYYY-MM-DD"))?;
            as_of = Some(date);
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((as_of, rest))
}

/// The value following `--name`, if present.
pub(crate) fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

pub(crate) fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor the values of `value_flags`.
pub(crate) fn positionals<'a>(args: &'a [String], value_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if value_flags.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
