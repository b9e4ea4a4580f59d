//! Example walking through one comparison session
//!
//! Run with: cargo run --example compare_demo

use docmark::config::Settings;
use docmark::document::DocumentPayload;
use docmark::exporter::NullPublisher;
use docmark::loader::PlainTextLoader;
use docmark::render::Side;
use docmark::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Docmark Comparison Demo ===\n");

    let base = "The cat sat on the mat.\n\nIt was 3 o'clock.";
    let compare = "The dog sat on the mat.\n\nIt was 4 o'clock, 下午.";

    let loader = PlainTextLoader::default();
    let mut session = Session::new(Settings::default(), Box::new(NullPublisher));
    session.load_base(&loader, DocumentPayload::new("base.txt", base))?;
    session.load_compare(&loader, DocumentPayload::new("compare.txt", compare))?;

    if let Some(original) = session.original_view(Side::Base) {
        println!("Base document:\n  {}\n", original);
    }
    println!("Before comparing:\n  {}\n", session.marked_view(Side::Base));

    let diff = session.run_compare()?;
    println!("Diff parts:");
    for part in diff.parts() {
        println!("  {:?} {:?}", part.kind, part.value);
    }

    if let Some(stats) = session.stats() {
        println!("\n{}", stats);
    }

    println!("\nBase (deletions):\n  {}", session.mark_base()?);
    println!("\nCompare (insertions):\n  {}", session.mark_compare()?);

    Ok(())
}
