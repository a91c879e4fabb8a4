use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span};

use dsim_cli::render::Renderer;
use dsim_cli::settings::{Settings, read_mapping_file};
use dsim_cli::shell::Shell;
use dsim_client::ApiClient;
use dsim_core::{ActiveView, Session, SubmitOutcome};
use dsim_ingest::{UploadedFile, mapping_coverage, preview_csv, suggest_mapping};
use dsim_model::MappingConfig;

use crate::cli::{
    ConfigAction, FetchArgs, FetchKind, InspectArgs, MappingArgs, MappingSource, ShellArgs,
    SimulateArgs,
};

/// Settings plus the global flags that override them.
pub struct RunContext<'a> {
    pub settings: Settings,
    pub settings_path: &'a Path,
    pub api_url: Option<&'a str>,
    pub timeout: Option<u64>,
    pub renderer: Renderer,
}

impl RunContext<'_> {
    fn client(&self) -> Result<ApiClient> {
        let config = self.settings.client_config(self.api_url, self.timeout);
        ApiClient::new(config).context("failed to build HTTP client")
    }
}

pub fn run_simulate(ctx: &RunContext<'_>, args: &SimulateArgs) -> Result<i32> {
    let span = info_span!("simulate", file = %args.file.display());
    let _guard = span.enter();

    let file = UploadedFile::open(&args.file)?;
    let mapping = resolve_mapping(ctx, &args.mapping, Some(&file))?;
    let mut session = Session::new(mapping);
    warn_coverage(ctx, &session, &file);
    session.select_file(file);

    let client = ctx.client()?;
    match session.submit(&client) {
        SubmitOutcome::Succeeded => {}
        SubmitOutcome::Failed { message } => {
            eprintln!("error: {message}");
            return Ok(1);
        }
        SubmitOutcome::NoFile | SubmitOutcome::Busy => {
            bail!("simulation was not submitted")
        }
    }

    let result = session
        .result()
        .ok_or_else(|| anyhow!("simulation returned no result"))?;
    if args.json {
        println!("{}", result.payload().to_pretty_string());
        return Ok(0);
    }

    if let Some(term) = &args.search {
        session.set_search_term(term.as_str());
    }
    let views: Vec<ActiveView> = if args.all_views {
        ActiveView::ALL.to_vec()
    } else {
        vec![args.view.unwrap_or(ctx.settings.workspace.default_view)]
    };
    let mut sections = Vec::with_capacity(views.len());
    for view in views {
        session.set_view(view);
        sections.push(ctx.renderer.workspace(&mut session));
    }
    println!("{}", sections.join("\n\n"));
    Ok(0)
}

pub fn run_shell(ctx: &RunContext<'_>, args: &ShellArgs) -> Result<i32> {
    let file = args
        .file
        .as_deref()
        .map(UploadedFile::open)
        .transpose()?;
    let mapping = resolve_mapping(ctx, &args.mapping, file.as_ref())?;
    let mut session = Session::new(mapping);
    session.set_view(ctx.settings.workspace.default_view);
    if let Some(file) = file {
        warn_coverage(ctx, &session, &file);
        session.select_file(file);
    }

    let client = ctx.client()?;
    let mut shell = Shell::new(session, &client, ctx.renderer);
    let stdin = io::stdin();
    shell
        .run(stdin.lock(), io::stdout())
        .context("shell input/output failed")?;
    Ok(0)
}

pub fn run_inspect(ctx: &RunContext<'_>, args: &InspectArgs) -> Result<i32> {
    let file = UploadedFile::open(&args.file)?;
    let preview = preview_csv(&args.file, args.samples)
        .with_context(|| format!("failed to preview {}", args.file.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(0);
    }
    println!("{}", ctx.renderer.preview(&preview));

    let mapping = resolve_mapping(ctx, &args.mapping, Some(&file))?;
    let Some(headers) = file.headers() else {
        println!("No header row; mapping not checked.");
        return Ok(0);
    };
    let coverage = mapping_coverage(&mapping, &headers);
    if coverage.is_clean() {
        println!("Mapping covers every analysis field.");
    } else {
        println!("{}", ctx.renderer.coverage(&coverage));
    }
    Ok(0)
}

pub fn run_mapping(ctx: &RunContext<'_>, args: &MappingArgs) -> Result<i32> {
    let file = UploadedFile::open(&args.file)?;
    let headers = file
        .headers()
        .ok_or_else(|| anyhow!("{} has no header row", args.file.display()))?;
    let suggestion = suggest_mapping(&headers);
    let mapping = suggestion.to_mapping();
    println!("{}", ctx.renderer.suggestion(&suggestion));
    println!("{}", mapping.text());

    if let Some(path) = &args.write {
        std::fs::write(path, mapping.text())
            .with_context(|| format!("failed to write mapping to {}", path.display()))?;
        info!(path = %path.display(), "Mapping written");
    }
    if !suggestion.is_complete() {
        eprintln!(
            "note: no column found for {}; the default column is kept",
            suggestion.unmatched.join(", ")
        );
    }
    Ok(0)
}

pub fn run_fetch(ctx: &RunContext<'_>, args: &FetchArgs) -> Result<i32> {
    let client = ctx.client()?;
    let output = match args.kind {
        FetchKind::Forecast => ctx.renderer.forecast_points(&client.fetch_forecast()?),
        FetchKind::Clusters => ctx.renderer.cluster_points(&client.fetch_clusters()?),
        FetchKind::Anomalies => ctx.renderer.anomaly_alerts(&client.fetch_anomalies()?),
        FetchKind::Insights => ctx.renderer.insights(&client.fetch_insights()?),
        FetchKind::Report => ctx.renderer.ai_report(&client.fetch_report()?),
    };
    println!("{output}");
    Ok(0)
}

pub fn run_health(ctx: &RunContext<'_>) -> Result<i32> {
    let client = ctx.client()?;
    let health = client.health()?;
    println!("{}", ctx.renderer.health(&health));
    Ok(if health.is_online() { 0 } else { 1 })
}

pub fn run_config(ctx: &RunContext<'_>, action: &ConfigAction) -> Result<i32> {
    match action {
        ConfigAction::Show => print!("{}", ctx.settings.to_toml()?),
        ConfigAction::Path => println!("{}", ctx.settings_path.display()),
        ConfigAction::Init { force } => {
            if ctx.settings_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to replace it)",
                    ctx.settings_path.display()
                );
            }
            Settings::default().save_to(ctx.settings_path)?;
            println!("Wrote {}", ctx.settings_path.display());
        }
    }
    Ok(0)
}

/// Mapping from the flags, else the settings file, else the default.
fn resolve_mapping(
    ctx: &RunContext<'_>,
    source: &MappingSource,
    file: Option<&UploadedFile>,
) -> Result<MappingConfig> {
    if let Some(text) = &source.mapping_json {
        return Ok(MappingConfig::from_text(text.as_str()));
    }
    if let Some(path) = &source.mapping_file {
        return read_mapping_file(path);
    }
    if source.suggest {
        let headers = file
            .and_then(UploadedFile::headers)
            .ok_or_else(|| anyhow!("--suggest-mapping needs a CSV file with a header row"))?;
        return Ok(suggest_mapping(&headers).to_mapping());
    }
    ctx.settings.workspace.mapping()
}

/// Prints advisory mapping warnings to stderr. Never blocks.
fn warn_coverage(ctx: &RunContext<'_>, session: &Session, file: &UploadedFile) {
    let Some(headers) = file.headers() else {
        return;
    };
    let warnings = ctx
        .renderer
        .coverage(&mapping_coverage(session.mapping(), &headers));
    if !warnings.is_empty() {
        eprintln!("{warnings}");
    }
}

/// Whether stdout output should carry ANSI styling.
pub fn stdout_color(choice: clap::ColorChoice) -> bool {
    match choice {
        clap::ColorChoice::Always => true,
        clap::ColorChoice::Never => false,
        clap::ColorChoice::Auto => io::stdout().is_terminal(),
    }
}
