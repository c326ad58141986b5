use bgv::definition::keys;
use bgv::{AlignTarget, Catalog, Settings};
use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use rayon::prelude::*;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Components every frame in the gallery is fitted with, before its own
/// values.
const COMPONENTS: &[&str] = &["seat318", "head118", "wheel29er", "forkSurlyOgre"];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run -p xtask -- <command>");
        eprintln!("Commands:");
        eprintln!("  gallery [out-dir]                      Render every catalog frame to its own SVG");
        eprintln!("  compare <frame> <frame> [target] [out] Draw two frames aligned at bb|front|rear|head");
        std::process::exit(1);
    }

    let catalog = Catalog::builtin()?;
    match args[1].as_str() {
        "gallery" => gallery(&catalog, args.get(2).map(|s| Utf8PathBuf::from(s.clone())).unwrap_or_else(out_dir)),
        "compare" => {
            let (Some(a), Some(b)) = (args.get(2), args.get(3)) else {
                return Err(miette!("compare needs two frame names"));
            };
            let target = parse_target(args.get(4).map(String::as_str).unwrap_or("bb"))?;
            let out = args
                .get(5)
                .map(|s| Utf8PathBuf::from(s.clone()))
                .unwrap_or_else(|| out_dir().join(format!("{a}-vs-{b}.svg")));
            compare(&catalog, a, b, target, &out)
        }
        other => Err(miette!("unknown command: {other}")),
    }
}

fn out_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../target/bgv")
}

fn parse_target(name: &str) -> Result<AlignTarget> {
    match name {
        "bb" => Ok(AlignTarget::BottomBracket),
        "front" => Ok(AlignTarget::FrontHub),
        "rear" => Ok(AlignTarget::RearHub),
        "head" => Ok(AlignTarget::HeadTop),
        other => Err(miette!("unknown alignment target `{other}`, expected bb, front, rear or head")),
    }
}

/// Fragments that describe a whole frame rather than a component.
fn frame_names(catalog: &Catalog) -> Vec<&str> {
    catalog
        .names()
        .filter(|name| catalog.get(name).is_some_and(|def| def.contains(keys::NAME)))
        .collect()
}

fn composition<'a>(frame: &'a str) -> Vec<&'a str> {
    let mut names = COMPONENTS.to_vec();
    names.push(frame);
    names
}

fn gallery(catalog: &Catalog, out: Utf8PathBuf) -> Result<()> {
    fs::create_dir_all(&out).into_diagnostic()?;
    let settings = Settings::default();

    let results: Vec<(&str, Result<()>)> = frame_names(catalog)
        .into_par_iter()
        .map(|frame| {
            let result = bgv::visualise(catalog, &[&composition(frame)], &settings, AlignTarget::default())
                .and_then(|svg| {
                    let path = out.join(format!("{frame}.svg"));
                    fs::write(&path, svg)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("writing {path}"))
                });
            (frame, result)
        })
        .collect();

    let mut failed = 0;
    for (frame, result) in &results {
        match result {
            Ok(()) => eprintln!("rendered {frame}"),
            Err(e) => {
                failed += 1;
                eprintln!("{frame}: {e:?}");
            }
        }
    }
    eprintln!("{} of {} frames written to {out}", results.len() - failed, results.len());
    if failed > 0 {
        return Err(miette!("{failed} frames failed"));
    }
    Ok(())
}

fn compare(catalog: &Catalog, a: &str, b: &str, target: AlignTarget, out: &Utf8Path) -> Result<()> {
    let svg = bgv::visualise(
        catalog,
        &[&composition(a), &composition(b)],
        &Settings::default(),
        target,
    )?;
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(out, svg).into_diagnostic()?;
    eprintln!("wrote {out}");
    Ok(())
}
