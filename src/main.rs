use billpress::{GenerationError, find_overlaps, layout_document};
use std::env;
use std::fs;

/// Offline diagnostic: lays out a template against a data set, reports every
/// overlapping element pair per page, and optionally writes the rendered PDF.
fn main() -> Result<(), GenerationError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Checks a bill template for element overlap and renders it.");
        eprintln!();
        eprintln!(
            "Usage: {} <path/to/template.json> <path/to/data.json> [path/to/output.pdf]",
            args[0]
        );
        std::process::exit(1);
    }

    let template_json = fs::read_to_string(&args[1])?;
    let data_json = fs::read_to_string(&args[2])?;

    let result = layout_document(&template_json, &data_json)?;
    println!("Laid out {} page(s).", result.pages.len());

    for warning in &result.warnings {
        println!("warning: {warning}");
    }

    let hits = find_overlaps(&result.pages);
    if hits.is_empty() {
        println!("No overlapping elements detected.");
    } else {
        println!("{} overlapping pair(s):", hits.len());
        for hit in &hits {
            println!("  page {}:", hit.page_index);
            for info in [&hit.first, &hit.second] {
                println!(
                    "    `{}` \"{}\" at ({:.1}, {:.1}) {:.1}x{:.1}",
                    info.id,
                    info.preview,
                    info.rect.x,
                    info.rect.y,
                    info.rect.width,
                    info.rect.height
                );
            }
        }
    }

    if let Some(output_path) = args.get(3) {
        let output = billpress::generate(&template_json, &data_json)?;
        fs::write(output_path, &output.pdf)?;
        println!("Wrote {} ({} bytes).", output_path, output.pdf.len());
    }

    Ok(())
}
