mod platform;

use anyhow::Result;

fn main() -> Result<()> {
    let options = platform::cli::Options::from_args(std::env::args().skip(1))?;
    platform::logging::initialize(platform::logging::LogDestination::Both);
    platform::app::run(options)
}
