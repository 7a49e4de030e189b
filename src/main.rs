//! resume-forge – command-line resume → PDF renderer.
//!
//! Usage:
//!   resume-forge <resume.json> [output.pdf] [--template modern] [--margin medium]
//!
//! If `output.pdf` is omitted the PDF is written to the current directory as
//! `resume_<name>.pdf`.

use std::{env, fs, path::PathBuf, process};

use resume_forge::export::export_file_name;
use resume_forge::fonts::FontManager;
use resume_forge::geometry::MarginSize;
use resume_forge::model::ResumeDocument;
use resume_forge::pipeline::{generate_pdf_with_fonts, EngineConfig};
use resume_forge::templates::{TemplateId, TemplateRegistry};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut font_path: Option<PathBuf> = None;
    let mut template: Option<TemplateId> = None;
    let mut margin: Option<MarginSize> = None;
    let mut width_mm: Option<f32> = None;
    let mut height_mm: Option<f32> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--template" | "-t" => template = Some(parse_or_exit(arg, iter.next())),
            "--margin" | "-m" => margin = Some(parse_or_exit(arg, iter.next())),
            "--width" => width_mm = Some(parse_or_exit(arg, iter.next())),
            "--height" => height_mm = Some(parse_or_exit(arg, iter.next())),
            "--config" | "-c" => config_path = Some(parse_or_exit(arg, iter.next())),
            "--layout-json" => layout_path = Some(parse_or_exit(arg, iter.next())),
            "--font" => font_path = Some(parse_or_exit(arg, iter.next())),
            "--list-templates" => {
                for info in TemplateRegistry::builtin().list() {
                    println!("{:<14} {:<14} {}", info.id, info.name, info.description);
                }
                process::exit(0);
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no resume file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Config file first, flags on top.
    let mut config = match &config_path {
        Some(path) => EngineConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error reading config '{}': {e}", path.display());
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    if let Some(t) = template {
        config.template = t;
    }
    if let Some(m) = margin {
        config.margin = m;
    }
    if let Some(w) = width_mm {
        config.page_width_mm = w;
    }
    if let Some(h) = height_mm {
        config.page_height_mm = h;
    }

    let json = fs::read_to_string(&input).unwrap_or_else(|e| {
        eprintln!("Error reading '{}': {e}", input.display());
        process::exit(1);
    });
    let doc = ResumeDocument::from_json(&json).unwrap_or_else(|e| {
        eprintln!("Error parsing '{}': {e}", input.display());
        process::exit(1);
    });

    let mut fonts = FontManager::new();
    if let Some(path) = &font_path {
        let loaded = fs::read(path)
            .map_err(resume_forge::Error::from)
            .and_then(|bytes| fonts.load_font("Helvetica", false, false, bytes));
        if let Err(e) = loaded {
            eprintln!("Error loading font '{}': {e}", path.display());
            process::exit(1);
        }
    }

    let output = output_path.unwrap_or_else(|| PathBuf::from(export_file_name(&doc.personal)));

    match generate_pdf_with_fonts(&doc, &config, &fonts) {
        Ok((bytes, layout)) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            if let Some(path) = &layout_path {
                if let Err(e) = fs::write(path, layout.to_json()) {
                    eprintln!("Error writing '{}': {e}", path.display());
                    process::exit(1);
                }
            }
            let pages = layout.page_count();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

/// Parse a flag's value, exiting with a message when it is missing or invalid.
fn parse_or_exit<T>(flag: &str, value: Option<&String>) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = value else {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    };
    value.parse().unwrap_or_else(|e| {
        eprintln!("Invalid value for {flag}: {e}");
        process::exit(1);
    })
}

fn print_usage(prog: &str) {
    eprintln!("resume-forge – resume JSON to paginated PDF");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <resume.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <resume.json>  Resume document (personal, experience, education, skills)");
    eprintln!("  [output.pdf]   Output path (default: resume_<name>.pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --template, -t     classic | modern | minimal | professional | creative");
    eprintln!("  --margin, -m       small (10mm) | medium (15mm) | large (20mm)");
    eprintln!("  --config, -c       JSON engine config; flags override its values");
    eprintln!("  --width, --height  Page size in mm (default: A4 210×297)");
    eprintln!("  --font             TTF/OTF used for text measurement");
    eprintln!("  --layout-json      Also write the composed page layout as JSON");
    eprintln!("  --list-templates   Print the built-in templates and exit");
    eprintln!("  --help             Print this message");
}
