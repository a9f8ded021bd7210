extern crate clap;
extern crate env_logger;
extern crate relscan;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use relscan::config::DEFAULT_BLOCK_SIZE;
use relscan::prelude::*;

#[derive(Parser)]
#[command(
    name = "relscan",
    about = "Relative search over binary files: finds every offset where some encoding of a keyword is embedded",
    version
)]
struct Args {
    /// Binary file to search
    file: PathBuf,

    /// Text keyword to search for
    #[arg(short, long, required_unless_present = "values", conflicts_with = "values")]
    keyword: Option<String>,

    /// Comma separated signed values for a value scan instead of a keyword
    ///
    /// Example: 105,106,107,108
    #[arg(long, value_delimiter = ',')]
    values: Vec<i16>,

    /// Wildcard character inside the keyword
    #[arg(short, long, default_value_t = '*')]
    wildcard: char,

    /// Custom character sequence defining the alphabet order
    #[arg(short, long, default_value = "")]
    sequence: String,

    /// Scan 16-bit code units instead of bytes
    #[arg(long)]
    wide: bool,

    /// Treat 16-bit code units as big-endian
    #[arg(long)]
    big_endian: bool,

    /// Worker thread count (0 = automatic)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Base search block size in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// Preview window width in code units
    #[arg(long, default_value_t = 40)]
    preview_width: usize,

    /// Skip preview generation
    #[arg(long)]
    no_preview: bool,
}

fn main() {
    env_logger::builder().format_timestamp_nanos().init();

    match real_main() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("relscan: {err}");
            std::process::exit(2)
        }
    }
}

fn real_main() -> Result<i32> {
    let args = Args::parse();

    let config = SearchConfigBuilder::default()
        .file_path(args.file.clone())
        .is_relative_search(args.values.is_empty())
        .endianness(if args.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        })
        .keyword(code_points(args.keyword.as_deref().unwrap_or_default()))
        .wildcard(u32::from(args.wildcard))
        .custom_char_seq(code_points(&args.sequence))
        .reference_values(args.values.clone())
        .preferred_num_threads(args.threads)
        .preferred_search_block_size(args.block_size)
        .preferred_preview_width(args.preview_width)
        .build()
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let want_previews = !args.no_preview;
    let found = if args.wide {
        print_results(run_search::<u16>(config, want_previews)?, want_previews)
    } else {
        print_results(run_search::<u8>(config, want_previews)?, want_previews)
    };

    // grep-like exit status: 0 when something was found
    Ok(if found { 0 } else { 1 })
}

fn run_search<T: CodeUnit>(config: SearchConfig, want_previews: bool) -> Result<Vec<SearchResult<T>>> {
    let abort = AtomicBool::new(false);
    let mut last_reported = u8::MAX;

    let results = SearchEngine::<T>::new(config).run(
        |percent, step| {
            if step == SearchStep::Searching && percent != last_reported {
                last_reported = percent;
                eprint!("\rsearching... {percent:>3}%");
                let _ = io::stderr().flush();
            }
        },
        &abort,
        want_previews,
    )?;

    eprint!("\r                    \r");
    Ok(results)
}

fn print_results<T: CodeUnit>(results: Vec<SearchResult<T>>, want_previews: bool) -> bool {
    let found = !results.is_empty();

    for result in &results {
        if want_previews {
            println!("{:#010x}  {}", result.offset, result.preview);
        } else {
            println!("{:#010x}", result.offset);
        }
    }
    eprintln!("{} match(es)", results.len());

    found
}
