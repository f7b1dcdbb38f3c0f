//! `weld resolve` command implementation.
//!
//! Runs one resolution outside the server. Input comes from a file or stdin,
//! the resolved document goes to stdout and diagnostics go to stderr.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde_json::Value;
use weld_config::{CliSettings, Config};
use weld_resolver::{Diagnostics, RequestContext, Resolver};

use crate::commands::build_resolver;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Input file (default: stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover weld.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat the input as a JSON payload instead of raw HTML.
    #[arg(long)]
    json: bool,

    /// Preferred languages, as an `Accept-Language` header value.
    #[arg(short, long)]
    lang: Option<String>,

    /// Template directory (overrides config).
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,

    /// Do not register the built-in widgets.
    #[arg(long)]
    no_builtin: bool,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or parsed, or if the
    /// configuration is invalid. Element failures are reported as warnings.
    pub(crate) async fn execute(self, output: &Output, verbose: bool) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            templates_dir: self.templates_dir,
            builtin_widgets: self.no_builtin.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let resolver = build_resolver(&config)?;

        let input = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let mut ctx = RequestContext::new("weld://resolve").with_method("POST");
        if let Some(lang) = &self.lang {
            ctx = ctx.with_header("accept-language", lang.as_str());
        }
        let ctx = Arc::new(ctx);

        let result = resolve_input(&resolver, &input, self.json, &ctx).await?;
        output.document(&result)?;

        report(output, &ctx.diagnostics(), verbose);
        Ok(())
    }
}

/// Resolve `input` as HTML, or as a JSON payload when `json` is set.
async fn resolve_input(
    resolver: &Resolver,
    input: &str,
    json: bool,
    ctx: &Arc<RequestContext>,
) -> Result<String, CliError> {
    if json {
        let mut payload: Value = serde_json::from_str(input)?;
        let resolved = resolver.resolve_payload(&mut payload, ctx).await;
        tracing::info!(resolved, "Resolved payload strings");
        Ok(serde_json::to_string_pretty(&payload)?)
    } else {
        Ok(resolver.resolve_html(input, ctx).await?)
    }
}

fn report(output: &Output, diagnostics: &Diagnostics, verbose: bool) {
    for error in &diagnostics.errors {
        output.warning(&format!("Warning: {error}"));
    }
    if verbose {
        for note in &diagnostics.notes {
            output.info(note);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn resolver() -> Resolver {
        build_resolver(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_input_html() {
        let ctx = Arc::new(RequestContext::new("weld://resolve"));

        let out = resolve_input(
            &resolver(),
            r#"<h1>T</h1><div data-widget-type="button" data-widget-conf-href="/b">B</div>"#,
            false,
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(
            out,
            r#"<h1>T</h1><button onclick="document.location='/b'">B</button>"#
        );
        assert!(ctx.diagnostics().errors.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_input_json() {
        let ctx = Arc::new(RequestContext::new("weld://resolve"));
        let input = json!({"items": ["<x-missing></x-missing>", "plain"]}).to_string();

        let out = resolve_input(&resolver(), &input, true, &ctx).await.unwrap();

        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            json!({"items": ["<!-- Unknown element: x-missing -->", "plain"]})
        );
    }

    #[tokio::test]
    async fn test_resolve_input_invalid_json() {
        let ctx = Arc::new(RequestContext::new("weld://resolve"));

        let err = resolve_input(&resolver(), "{", true, &ctx).await.unwrap_err();

        assert!(matches!(err, CliError::Json(_)));
    }
}
