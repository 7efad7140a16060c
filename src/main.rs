use std::path::Path;

use clap::Parser;
use window_probe::cli::commands::{cmd_capture, cmd_click, cmd_extract, cmd_focus, cmd_list};
use window_probe::cli::config::{
    Cli, Commands, load_config, resolve_extractor_path, resolve_out_dir,
};
use window_probe::session::session::{ExtractorSession, ensure_extractor};
use window_probe::trace::logger::TraceLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let extractor = resolve_extractor_path(cli.extractor.as_deref(), &config).ok_or(
        "no extractor configured: pass --extractor, set extractor.path in window-probe.yaml, \
         or export WINDOW_PROBE_EXTRACTOR",
    )?;
    let extractor = ensure_extractor(Path::new(&extractor))?;

    let mut session = ExtractorSession::new(extractor)
        .with_auto_retry(config.session.auto_retry)
        .with_verbose(cli.verbose);

    // Trace path: CLI > config, tracing off when neither is set
    if let Some(path) = cli.trace.as_deref().or(config.trace.path.as_deref()) {
        session = session.with_trace(TraceLogger::new(path));
    }

    match cli.command {
        Commands::List => {
            cmd_list(&session)?;
        }
        Commands::Extract {
            query,
            window_id,
            out,
        } => {
            let out = resolve_out_dir(out.as_deref(), &config);
            cmd_extract(
                &session,
                query.as_deref(),
                window_id.as_deref(),
                &out,
                cli.verbose,
            )?;
        }
        Commands::Click {
            query,
            node,
            annotate,
            out,
        } => {
            let out = resolve_out_dir(out.as_deref(), &config);
            cmd_click(&session, &query, &node, annotate, &out, cli.verbose)?;
        }
        Commands::Focus { query, window_id } => {
            cmd_focus(&session, query.as_deref(), window_id.as_deref())?;
        }
        Commands::Capture { query, out } => {
            let out = resolve_out_dir(out.as_deref(), &config);
            cmd_capture(&session, query.as_deref(), &out, cli.verbose)?;
        }
    }

    Ok(())
}
