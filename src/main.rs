use clap::Parser;
use codanna_kgraph::cli::{Cli, Commands};
use codanna_kgraph::emit::{GraphSink, InMemorySink, LoggingSink};
use codanna_kgraph::error::ErrorContext;
use codanna_kgraph::{logging, pipeline::Pipeline, Settings};

fn load_settings(path: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path).context("failed to load configuration"),
        None => Settings::load().context("failed to load configuration"),
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            path,
            config,
            dry_run,
        } => {
            let settings = load_settings(config.as_deref())?;
            let progress = settings.indexing.progress.then(|| {
                let bar = indicatif::ProgressBar::new_spinner();
                bar.set_message("indexing...");
                bar.enable_steady_tick(std::time::Duration::from_millis(100));
                bar
            });

            let pipeline = Pipeline::new(&settings);
            let stats = if dry_run {
                let mut sink = LoggingSink::new();
                run_and_report(&pipeline, &path, &mut sink)?
            } else {
                let mut sink = InMemorySink::new();
                let stats = run_and_report(&pipeline, &path, &mut sink)?;
                println!(
                    "{} nodes, {} relationships retained",
                    sink.node_count(),
                    sink.relationship_count()
                );
                stats
            };

            if let Some(bar) = progress {
                bar.finish_and_clear();
            }
            println!("{stats}");
            Ok(())
        }

        Commands::CheckConfig { path } => {
            let settings = load_settings(path.as_deref())?;
            let rendered = toml::to_string_pretty(&settings)
                .context("failed to render configuration as TOML")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

fn run_and_report(
    pipeline: &Pipeline<'_>,
    path: &std::path::Path,
    sink: &mut dyn GraphSink,
) -> anyhow::Result<codanna_kgraph::IndexingStats> {
    pipeline.run(path, sink).with_path(path)
}
