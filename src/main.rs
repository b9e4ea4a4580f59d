use docmark::config::Config;
use docmark::document::DocumentPayload;
use docmark::exporter::{ComparisonReport, HtmlExporter, write_report};
use docmark::loader::PlainTextLoader;
use docmark::session::Session;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(base), Some(compare)) = (args.next(), args.next()) else {
        eprintln!("usage: docmark <base> <compare> [output-dir]");
        return ExitCode::from(2);
    };
    let output_dir = args.next().map(PathBuf::from);

    match run(PathBuf::from(base), PathBuf::from(compare), output_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    base: PathBuf,
    compare: PathBuf,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output_dir = output_dir.unwrap_or_else(|| config.export_dir());

    let loader = PlainTextLoader::new(&config.settings.loader);
    let exporter = HtmlExporter::new(&output_dir)?;
    let mut session = Session::new(config.settings.clone(), Box::new(exporter));

    session.load_base(&loader, DocumentPayload::from_path(&base)?)?;
    session.load_compare(&loader, DocumentPayload::from_path(&compare)?)?;

    let report = ComparisonReport::from_result(session.run_compare()?);
    println!("{}", report.stats);

    session.mark_base()?;
    session.mark_compare()?;

    let report_path = write_report(&output_dir, &report)?;
    println!("Marked copies and report written to {}", output_dir.display());
    println!("Report: {}", report_path.display());

    Ok(())
}
