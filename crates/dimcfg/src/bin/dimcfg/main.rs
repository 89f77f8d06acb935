mod cli;

use dimcfg::algebra::Containment;
use dimcfg::value::Value;
use dimcfg::{Config, Options};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("DIMCFG_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let command_result = match cli.command {
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let document = load(&cli.input)?;

    let options = Options {
        containment: if cli.all_keys {
            Containment::AllKeys
        } else {
            Containment::FirstKey
        },
    };

    let mut config = Config::parse_with(&document, options)?;
    config.filter(&cli.filters)?;

    let products = config.products()?;
    tracing::info!(count = products.len(), "products rendered");

    match cli.output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &products)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), &products)?,
    };

    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Value> {
    let Some(file_path) = &input.file else {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(dimcfg::source::from_yaml_str(&stdin)?);
    };

    Ok(dimcfg::source::load_file(file_path)?)
}

/// (dimcfg-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let document = load(&cli.input)?;
    let config = Config::parse(&document)?;

    match cli.command {
        Dimensions => {
            for dimension in config.dimensions() {
                println!(
                    "{} {} (depends: {:?})",
                    dimension.name(),
                    dimension.brackets().marker(),
                    dimension.depends()
                );
                serde_yaml::to_writer(std::io::stdout(), &dimension.info())?;
            }
        }
        Tree => println!("{:#?}", config.tree()),
        Tuples => {
            for tuple in config.generate() {
                println!("{tuple}");
            }
        }
    }

    Ok(())
}
