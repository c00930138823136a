//! Render a built-in component from the command line.
//!
//! Inputs are given as repeated `--set key=value` pairs. Values are parsed as
//! JSON when they are valid JSON (`--set count=3`, `--set tags='["a","b"]'`)
//! and kept as plain strings otherwise (`--set name=Macron`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::bundle::{BundleValue, InputBundle};
use crate::cache::RenderCache;
use crate::component::{Component, Nested};
use crate::components::{BUILTIN_NAMES, builtin};
use crate::config::{CellConfig, TemplatingConfig};
use crate::memo::Memoized;

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Built-in component to render (formal-greeter, layout, card)
    component: String,

    /// Input value, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    inputs: Vec<(String, BundleValue)>,

    /// Literal nested content passed to the component
    #[arg(long, value_name = "TEXT", conflicts_with = "memoized")]
    nested_text: Option<String>,

    /// Render through a render cache sized from configuration
    #[arg(long)]
    memoized: bool,

    /// Number of times to render
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,
}

impl RenderCommand {
    pub fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = CellConfig::load_with_optional(config_path)?;
        let component = lookup(&self.component, &config.templating)?;
        let bundle: InputBundle = self.inputs.into_iter().collect();
        tracing::debug!("Rendering '{}' with {} input(s)", component.name(), bundle.len());

        if self.memoized {
            let cache = Arc::new(RenderCache::from_config(&config.cache)?);
            let memoized = Memoized::new(component, Arc::clone(&cache));
            for _ in 0..self.repeat {
                println!("{}", memoized.call(&bundle)?);
            }

            let stats = cache.stats();
            eprintln!(
                "{} {} hit(s), {} miss(es), {:.1}% hit rate",
                "Cache:".bold(),
                stats.hits,
                stats.misses,
                stats.hit_rate()
            );
            return Ok(());
        }

        for _ in 0..self.repeat {
            let output = match &self.nested_text {
                Some(text) => {
                    let produce = || Ok(text.clone());
                    component.render(&bundle, Nested::from_fn(&produce))
                }
                None => component.render_plain(&bundle),
            }
            .with_context(|| format!("Failed to render '{}'", self.component))?;
            println!("{output}");
        }
        Ok(())
    }
}

/// Resolve a built-in component, suggesting close names for typos.
fn lookup(name: &str, templating: &TemplatingConfig) -> Result<Arc<dyn Component>> {
    if let Some(component) = builtin(name, templating)? {
        return Ok(component);
    }

    let mut message = format!("Unknown component '{name}'");
    if let Some(closest) = BUILTIN_NAMES
        .iter()
        .map(|candidate| (strsim::levenshtein(name, candidate), *candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min()
        .map(|(_, candidate)| candidate)
    {
        message.push_str(&format!(". Did you mean '{closest}'?"));
    }
    message.push_str(&format!("\nAvailable components: {}", BUILTIN_NAMES.join(", ")));
    Err(anyhow::anyhow!(message))
}

/// Parse `key=value`, reading the value as JSON when possible.
fn parse_assignment(raw: &str) -> Result<(String, BundleValue), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }

    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => BundleValue::try_from(json)
            .map_err(|e| format!("invalid value for '{key}': {e}"))?,
        Err(_) => BundleValue::from(value),
    };
    Ok((key.to_string(), value))
}
