// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `scopegraph resolve`: bind every reference in a set of translation units.
//!
//! Each input file holds one JSON-encoded translation unit or an array of
//! them, as produced by a front end. All units are indexed together, so
//! references may reach records declared in any of them, plus the
//! `[[external]]` records of the manifest.
//!
//! The command exits non-zero if any unit was aborted or reported an
//! error-severity issue.

use crate::commands::manifest::{Manifest, find_manifest, parse_manifest};
use crate::diagnostic::{ResolveDiagnostic, plain_line, severity_name};
use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use scopegraph_core::ast::{Expression, TranslationUnit};
use scopegraph_core::ast_walker::for_each_expression;
use scopegraph_core::semantic_analysis::{
    RecordIndex, RecordIndexBuilder, ResolveError, ResolveOptions, UnitAnalysis, analyse_program,
};
use serde::Deserialize;
use tracing::{debug, info};

/// Arguments of `scopegraph resolve`.
#[derive(Debug, clap::Args)]
pub struct ResolveArgs {
    /// JSON files holding translation units
    #[arg(required = true)]
    pub units: Vec<Utf8PathBuf>,

    /// Manifest to read instead of `./scopegraph.toml`
    #[arg(long)]
    pub manifest: Option<Utf8PathBuf>,

    /// Output format: `text` or `json`
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Do not warn about same-named locals in sibling scopes
    #[arg(long)]
    pub no_shadow_warnings: bool,

    /// Report every unresolved reference as a note
    #[arg(long)]
    pub report_unresolved: bool,
}

/// Output format for the resolution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable summary with miette diagnostics (default).
    #[default]
    Text,
    /// Machine-readable JSON (one object per unit per line).
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown format '{other}': expected 'text' or 'json'"
            )),
        }
    }
}

/// A unit file holds one unit or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum UnitFile {
    Many(Vec<TranslationUnit>),
    One(Box<TranslationUnit>),
}

/// Run the resolver over `args.units`.
pub fn run(args: &ResolveArgs) -> Result<()> {
    let manifest = match &args.manifest {
        Some(path) => parse_manifest(path)?,
        None => find_manifest(Utf8Path::new("."))?.unwrap_or_default(),
    };
    let options = effective_options(&manifest, args);
    debug!(?options, externals = manifest.external.len(), "loaded configuration");

    let mut units = Vec::new();
    for path in &args.units {
        units.extend(load_units(path)?);
    }
    if units.is_empty() {
        miette::bail!("No translation units found in the given files");
    }

    let index = build_index(&units, manifest.external);
    info!(units = units.len(), records = index.len(), "resolving");
    let results = analyse_program(&mut units, &index, &options);

    let mut failed = 0usize;
    for (unit, result) in units.iter().zip(&results) {
        if result.as_ref().map_or(true, UnitAnalysis::has_errors) {
            failed += 1;
        }
        match args.format {
            OutputFormat::Text => print_text(unit, result),
            OutputFormat::Json => println!("{}", unit_json(unit, result)),
        }
    }

    if failed > 0 {
        let plural = if failed == 1 { "" } else { "s" };
        miette::bail!("{failed} unit{plural} failed resolution");
    }
    Ok(())
}

/// Manifest options overridden by command-line flags.
fn effective_options(manifest: &Manifest, args: &ResolveArgs) -> ResolveOptions {
    let mut options = manifest.resolve;
    if args.no_shadow_warnings {
        options.report_ambiguous_shadows = false;
    }
    if args.report_unresolved {
        options.report_unresolved = true;
    }
    options
}

fn load_units(path: &Utf8Path) -> Result<Vec<TranslationUnit>> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{path}'"))?;
    let file: UnitFile = serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse translation units in '{path}'"))?;
    let units = match file {
        UnitFile::Many(units) => units,
        UnitFile::One(unit) => vec![*unit],
    };
    debug!(%path, units = units.len(), "loaded units");
    Ok(units)
}

fn build_index(
    units: &[TranslationUnit],
    externals: Vec<scopegraph_core::semantic_analysis::ExternalRecord>,
) -> RecordIndex {
    let mut builder = RecordIndexBuilder::new();
    for unit in units {
        builder.add_unit(unit);
    }
    for external in externals {
        builder.add_external(external);
    }
    builder.finish()
}

fn print_text(unit: &TranslationUnit, result: &Result<UnitAnalysis, ResolveError>) {
    let issues = match result {
        Ok(analysis) => {
            println!(
                "{}: {}/{} references resolved",
                unit.name,
                analysis.resolutions.resolved_count(),
                analysis.resolutions.visited_count()
            );
            analysis.issues.as_slice()
        }
        Err(error) => {
            println!("{}: aborted", unit.name);
            std::slice::from_ref(error)
        }
    };
    let source = unit
        .path
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok().map(|text| (path, text)));
    for issue in issues {
        match &source {
            Some((path, text)) => {
                let diag = ResolveDiagnostic::from_issue(issue, path.as_str(), text);
                eprintln!("{:?}", miette::Report::new(diag));
            }
            None => eprintln!("{}", plain_line(&unit.name, issue)),
        }
    }
}

fn issue_json(issue: &ResolveError) -> serde_json::Value {
    serde_json::json!({
        "severity": severity_name(issue.severity()),
        "message": issue.to_string(),
        "span_start": issue.span.start(),
        "span_end": issue.span.end(),
    })
}

fn unit_json(
    unit: &TranslationUnit,
    result: &Result<UnitAnalysis, ResolveError>,
) -> serde_json::Value {
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(error) => {
            return serde_json::json!({
                "unit": unit.name.as_str(),
                "status": "aborted",
                "issues": [issue_json(error)],
            });
        }
    };

    let mut bindings = Vec::new();
    for_each_expression(unit, &mut |expr| match expr {
        Expression::Reference(reference) => bindings.push(serde_json::json!({
            "id": reference.id,
            "name": reference.name.as_str(),
            "resolved": reference.resolved,
            "implicit_base": reference.implicit_base,
        })),
        Expression::Member(access) => bindings.push(serde_json::json!({
            "id": access.id,
            "member": access.member.as_str(),
            "resolved": access.resolved,
        })),
        _ => {}
    });

    serde_json::json!({
        "unit": unit.name.as_str(),
        "status": "ok",
        "references": analysis.resolutions.visited_count(),
        "resolved": analysis.resolutions.resolved_count(),
        "bindings": bindings,
        "issues": analysis.issues.iter().map(issue_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> ResolveArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ResolveArgs,
        }
        let argv = std::iter::once("resolve")
            .chain(flags.iter().copied())
            .chain(std::iter::once("unit.json"));
        Wrapper::parse_from(argv).args
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_flags_override_manifest() {
        let manifest = Manifest::default();
        let options = effective_options(&manifest, &args(&[]));
        assert_eq!(options, ResolveOptions::default());

        let options =
            effective_options(&manifest, &args(&["--no-shadow-warnings", "--report-unresolved"]));
        assert!(!options.report_ambiguous_shadows);
        assert!(options.report_unresolved);
    }

    #[test]
    fn test_manifest_options_kept_without_flags() {
        let manifest = Manifest {
            resolve: ResolveOptions {
                report_ambiguous_shadows: false,
                report_unresolved: true,
            },
            external: Vec::new(),
        };
        let options = effective_options(&manifest, &args(&["--format", "json"]));
        assert!(!options.report_ambiguous_shadows);
        assert!(options.report_unresolved);
    }

    #[test]
    fn test_unit_file_accepts_one_or_many() {
        let one = r#"{ "id": 0, "name": "A.java" }"#;
        let many = r#"[{ "id": 0, "name": "A.java" }, { "id": 1, "name": "B.java" }]"#;
        assert!(matches!(
            serde_json::from_str::<UnitFile>(one).unwrap(),
            UnitFile::One(_)
        ));
        assert!(matches!(
            serde_json::from_str::<UnitFile>(many).unwrap(),
            UnitFile::Many(units) if units.len() == 2
        ));
    }
}
