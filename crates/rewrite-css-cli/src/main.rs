//! rewrite-css: rebase `url()` references and `@import` targets in stylesheets.
//!
//! Reads configuration from `.config/rewrite-css.yaml` (if present), lets
//! command-line flags override it, and writes each rewritten file either into
//! `--out-dir` (keeping its path relative to the root) or to stdout.

mod config;
mod rebase;

use std::env;
use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, WrapErr};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use rewrite_css::{CssRewriter, SourceFile};

use crate::config::ResolvedConfig;
use crate::rebase::Rebase;

/// Rebase url() references in CSS files
#[derive(Facet, Debug)]
struct Args {
    /// Directory rebased URLs are made relative to
    #[facet(args::named, default)]
    root: Option<String>,

    /// Prepended to every rebased URL
    #[facet(args::named, default)]
    prefix: Option<String>,

    /// Write rewritten files here instead of stdout
    #[facet(args::named, args::short = 'o', default)]
    out_dir: Option<String>,

    /// Log every rewrite
    #[facet(args::named)]
    debug: bool,

    /// Minify the output
    #[facet(args::named)]
    minify: bool,

    /// Stylesheets to rewrite
    #[facet(args::positional, default)]
    files: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        "Failed to parse arguments".to_string()
    })
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rewrite_css=info".parse()?),
        )
        .init();
    Ok(())
}

/// Merge command-line flags over the discovered configuration
fn apply_args(mut config: ResolvedConfig, args: &Args, cwd: &Utf8Path) -> ResolvedConfig {
    if let Some(root) = &args.root {
        config.root = cwd.join(root);
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        config.out_dir = Some(cwd.join(out_dir));
    }
    config.options.debug |= args.debug;
    config.options.minify |= args.minify;
    config
}

/// Where a rewritten file goes: its path under the root, re-rooted in `out_dir`.
fn output_path(out_dir: &Utf8Path, root: &Utf8Path, file: &Utf8Path) -> Utf8PathBuf {
    match file.strip_prefix(root) {
        Ok(relative) => out_dir.join(relative),
        Err(_) => out_dir.join(file.file_name().unwrap_or(file.as_str())),
    }
}

async fn write_output(config: &ResolvedConfig, file: SourceFile) -> Result<()> {
    let path = file.path.clone();
    let Some(bytes) = file.into_bytes().await? else {
        return Ok(());
    };

    match &config.out_dir {
        Some(out_dir) => {
            let dest = output_path(out_dir, &config.root, &path);
            if let Some(parent) = dest.parent() {
                fs_err::tokio::create_dir_all(parent).await?;
            }
            fs_err::tokio::write(&dest, &bytes).await?;
            tracing::debug!(%path, %dest, "wrote rewritten stylesheet");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Returns false if any file failed.
async fn run(args: Args) -> Result<bool> {
    let cwd = config::current_dir()?;
    let config = apply_args(ResolvedConfig::discover(&cwd)?, &args, &cwd);

    let rewriter = CssRewriter::builder()
        .transformer(Rebase::new(&config.root, config.prefix.clone()))
        .options(config.options)
        .build()?;

    let mut ok = true;
    let mut files = Vec::new();
    for path in &args.files {
        let path = cwd.join(path);
        match tokio::fs::File::open(&path).await {
            Ok(handle) => files.push(SourceFile::stream(path, handle)),
            Err(e) => {
                eprintln!("{}: opening {path}: {e}", "error".red().bold());
                ok = false;
            }
        }
    }

    for result in rewriter.process_all(files).await {
        match result {
            Ok(file) => {
                let path = file.path.clone();
                write_output(&config, file)
                    .await
                    .wrap_err_with(|| format!("writing output for {path}"))?;
            }
            Err(e) => {
                tracing::warn!("{e}");
                eprintln!("{}: {e}", "error".red().bold());
                ok = false;
            }
        }
    }
    Ok(ok)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing() {
        eprintln!("{}: {e:?}", "error".red().bold());
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {e:?}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(files: &[&str]) -> Args {
        Args {
            root: None,
            prefix: None,
            out_dir: None,
            debug: false,
            minify: false,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_output_path_keeps_layout_under_root() {
        assert_eq!(
            output_path(
                Utf8Path::new("/out"),
                Utf8Path::new("/site"),
                Utf8Path::new("/site/css/a.css")
            ),
            "/out/css/a.css"
        );
        assert_eq!(
            output_path(
                Utf8Path::new("/out"),
                Utf8Path::new("/site"),
                Utf8Path::new("/elsewhere/b.css")
            ),
            "/out/b.css"
        );
    }

    #[test]
    fn test_flags_override_config() {
        let config = ResolvedConfig::resolve(Default::default(), Utf8Path::new("/site"));
        let mut args = args(&["a.css"]);
        args.prefix = Some("/static".to_string());
        args.root = Some("public".to_string());
        args.debug = true;

        let merged = apply_args(config, &args, Utf8Path::new("/work"));
        assert_eq!(merged.prefix, "/static");
        assert_eq!(merged.root, "/work/public");
        assert!(merged.options.debug);
        assert!(merged.out_dir.is_none());
    }

    #[tokio::test]
    async fn test_rewrites_files_into_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs_err::create_dir_all(root.join("css")).unwrap();
        fs_err::write(
            root.join("css/site.css"),
            "@import 'base.css';\n.hero { background-image: url(../img/hero.jpg) }\n",
        )
        .unwrap();

        let config = ResolvedConfig {
            root: root.clone(),
            prefix: "https://cdn.example.com".to_string(),
            out_dir: Some(root.join("dist")),
            options: Default::default(),
        };
        let rewriter = CssRewriter::builder()
            .transformer(Rebase::new(&config.root, config.prefix.clone()))
            .build()
            .unwrap();

        let handle = tokio::fs::File::open(root.join("css/site.css")).await.unwrap();
        let file = rewriter
            .process(SourceFile::stream(root.join("css/site.css"), handle))
            .await
            .unwrap();
        write_output(&config, file).await.unwrap();

        let out = fs_err::read_to_string(root.join("dist/css/site.css")).unwrap();
        assert!(
            out.contains(r#"@import url("https://cdn.example.com/css/base.css");"#),
            "output: {out}"
        );
        assert!(
            out.contains(r#"url("https://cdn.example.com/img/hero.jpg")"#),
            "output: {out}"
        );
    }
}
