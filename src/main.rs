use clap::Parser;
use eval_align::{cli, commands, config, error};
use cli::{Cli, Commands};
use commands::AlignOptions;
use config::Config;
use error::EvalAlignError;
use eval_align_common::Scorer;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "eval_align={lvl},eval_align_common={lvl}",
            lvl = default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // config サブコマンドは設定ファイルが壊れていても起動する
    let config = match cli.command {
        Commands::Config { .. } => Config::load_or_default(),
        _ => Config::load()?,
    };

    match cli.command {
        Commands::Align {
            left,
            right,
            threshold,
            metric,
            scorer,
            format,
            output,
            no_responses,
            parallel,
        } => {
            let mut options = AlignOptions::new(left, right, &config)
                .with_threshold_arg(threshold.as_deref());
            if let Some(metric) = metric {
                options.metric_name = metric;
            }
            if let Some(scorer) = scorer {
                options.scorer = scorer.parse::<Scorer>().map_err(EvalAlignError::from)?;
            }
            options.format = format;
            options.output = output;
            options.show_responses = !no_responses;
            options.parallel = parallel;

            commands::run_align(&options, &mut std::io::stdout().lock())?;
        }

        Commands::Metrics { left, right, metric, limit, output } => {
            let metrics = if metric.is_empty() {
                config.tracked_metrics.clone()
            } else {
                metric
            };
            commands::run_metrics(
                &left,
                &right,
                &metrics,
                limit,
                output.as_deref(),
                &mut std::io::stdout().lock(),
            )?;
        }

        Commands::Config { set_threshold, set_metric, set_scorer, show } => {
            let mut config = config;
            let changed = set_threshold.is_some() || set_metric.is_some() || set_scorer.is_some();

            if let Some(value) = set_threshold {
                config.set_threshold(value)?;
            }
            if let Some(metric) = set_metric {
                config.metric_name = metric;
            }
            if let Some(scorer) = set_scorer {
                config.scorer = scorer.parse::<Scorer>().map_err(EvalAlignError::from)?;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  閾値: {}", config.default_threshold);
                println!("  指標: {}", config.metric_name());
                println!("  比較指標: {}", config.tracked_metrics.join(", "));
                println!("  スコアラ: {}", config.scorer);
            }
        }
    }

    Ok(())
}
