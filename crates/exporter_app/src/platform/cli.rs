use std::path::PathBuf;

use anyhow::{bail, Result};
use exporter_engine::TabId;

const USAGE: &str =
    "usage: exporter_app <page.html> [--out DIR] [--bucket LABEL] [--url URL] [--tab N] [--direct]";

#[derive(Debug, Clone)]
pub struct Options {
    /// Saved conversation page to read.
    pub page: PathBuf,
    pub output_dir: PathBuf,
    pub bucket: Option<String>,
    /// Original page URL, used for conversation-id derivation and metadata.
    pub url: String,
    pub tab: TabId,
    /// Standalone one-shot path: extract, format, and write directly,
    /// bypassing the background worker.
    pub direct: bool,
}

impl Options {
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut page = None;
        let mut output_dir = None;
        let mut bucket = None;
        let mut url = None;
        let mut tab: TabId = 1;
        let mut direct = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => output_dir = Some(PathBuf::from(expect_value(&mut args, "--out")?)),
                "--bucket" => bucket = Some(expect_value(&mut args, "--bucket")?),
                "--url" => url = Some(expect_value(&mut args, "--url")?),
                "--tab" => {
                    let value = expect_value(&mut args, "--tab")?;
                    tab = value.parse()?;
                }
                "--direct" => direct = true,
                "--help" | "-h" => bail!("{USAGE}"),
                other if other.starts_with('-') => bail!("unknown option {other}\n{USAGE}"),
                other => {
                    if page.is_some() {
                        bail!("unexpected argument {other}\n{USAGE}");
                    }
                    page = Some(PathBuf::from(other));
                }
            }
        }

        let Some(page) = page else {
            bail!("missing page argument\n{USAGE}");
        };
        Ok(Self {
            page,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from("output")),
            bucket,
            url: url.unwrap_or_default(),
            tab,
            direct,
        })
    }
}

fn expect_value(args: &mut impl Iterator<Item = String>, option: &str) -> Result<String> {
    match args.next() {
        Some(value) => Ok(value),
        None => bail!("{option} needs a value\n{USAGE}"),
    }
}
