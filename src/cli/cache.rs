//! Render cache demonstration.
//!
//! `rendercell cache demo` pushes a fixed sequence of greetings through a
//! memoized `formal-greeter`, marking each call as a hit or a miss, then prints
//! the cache statistics. With a small `--capacity` the LRU evictions are easy
//! to follow.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::bundle::InputBundle;
use crate::cache::{CacheStats, RenderCache};
use crate::component::Instance;
use crate::components::FormalGreeter;
use crate::config::CellConfig;
use crate::memo::Memoized;

/// Names greeted by the demo, in order.
const DEMO_SEQUENCE: &[(&str, Option<&str>)] = &[
    ("Macron", None),
    ("Merkel", Some("Chancellor")),
    ("Macron", None),
    ("Sanchez", Some("Prime Minister")),
    ("Merkel", Some("Chancellor")),
    ("Macron", None),
];

#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommands,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommands {
    /// Run a short memoization demo and print statistics
    Demo {
        /// Cache capacity (defaults to the configured capacity)
        #[arg(long)]
        capacity: Option<usize>,
    },
}

impl CacheCommand {
    pub fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            CacheSubcommands::Demo {
                capacity,
            } => Self::demo(capacity, config_path),
        }
    }

    fn demo(capacity: Option<usize>, config_path: Option<PathBuf>) -> Result<()> {
        let config = CellConfig::load_with_optional(config_path)?;
        let mut cache_config = config.cache;
        if let Some(capacity) = capacity {
            cache_config.capacity = capacity;
        }

        let cache = Arc::new(RenderCache::from_config(&cache_config)?);
        let greeter = Memoized::new(Instance::<FormalGreeter>::new(), Arc::clone(&cache));

        println!(
            "{} capacity {}, {} locking\n",
            "Render cache demo:".bold(),
            cache.capacity(),
            cache.policy()
        );

        for (name, title) in DEMO_SEQUENCE {
            let mut builder = InputBundle::builder().insert("name", *name);
            if let Some(title) = title {
                builder = builder.insert("title", *title);
            }
            let bundle = builder.build();

            let misses_before = cache.stats().misses;
            let output = greeter.call(&bundle)?;
            let label = if cache.stats().misses > misses_before {
                "miss".yellow()
            } else {
                "hit ".green()
            };
            println!("  [{label}] {output}");
        }

        println!();
        print_stats(&cache.stats());
        Ok(())
    }
}

fn print_stats(stats: &CacheStats) {
    println!("{}", "Statistics".bold());
    println!("  entries:   {}/{}", stats.size, stats.capacity);
    println!("  hits:      {}", stats.hits);
    println!("  misses:    {}", stats.misses);
    println!("  evictions: {}", stats.evictions);
    println!("  hit rate:  {:.1}%", stats.hit_rate());
}
