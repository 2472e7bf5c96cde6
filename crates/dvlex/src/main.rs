#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

fn main() { entry::main(); }

mod entry {
    use std::{
        fs::File,
        io::{self, prelude::*, BufWriter},
        path::{Path, PathBuf},
    };

    use anyhow::{Context, Result};
    use clap::Parser;
    use dovetail::{
        catalog, ByteSource, CharSource, Spanned, StrSource, Strategy, Tokenizer, TokenKind,
    };
    use tracing_subscriber::{filter::LevelFilter, prelude::*};

    #[derive(Debug, Parser)]
    #[command(version, author, about)]
    #[allow(clippy::struct_excessive_bools)]
    struct Opts {
        /// Print more verbose logs
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// How to simulate the token automata
        #[arg(long, env = "DVLEX_STRATEGY", default_value = "merged")]
        strategy: Strategy,

        /// Read the input as raw bytes, one symbol per byte
        #[arg(long)]
        bytes: bool,

        /// Print the merged automaton as a Graphviz graph instead of lexing
        #[arg(long)]
        dot: bool,

        /// Prefix each token with its line and column
        #[arg(short, long)]
        positions: bool,

        /// Input file, or - for standard input
        #[arg(default_value = "-")]
        file: PathBuf,
    }

    #[inline]
    pub fn main() {
        let opts = Opts::parse();

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(match (cfg!(debug_assertions), opts.verbose) {
                (false, 0) => LevelFilter::INFO,
                (false, 1) | (true, 0) => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            })
            .init();

        tracing::debug!("{opts:#?}");

        std::process::exit(run(opts).map_or_else(
            |e| {
                tracing::error!("{e:?}");
                1
            },
            |()| 0,
        ));
    }

    fn is_stdin(file: &Path) -> bool { file.as_os_str() == "-" }

    #[inline]
    fn run(
        Opts {
            verbose: _,
            strategy,
            bytes,
            dot,
            positions,
            file,
        }: Opts,
    ) -> Result<()> {
        let mut out = BufWriter::new(io::stdout().lock());

        if dot {
            let merged = catalog::standard()
                .context("Error building token automata")?
                .merged()
                .context("Token catalog is empty")?;

            writeln!(out, "{}", merged.dot(|t| t.to_string().into()))
                .context("Error writing graph")?;
        } else if bytes {
            let reader: Box<dyn Read> = if is_stdin(&file) {
                Box::new(io::stdin().lock())
            } else {
                Box::new(
                    File::open(&file)
                        .with_context(|| format!("Error opening {}", file.display()))?,
                )
            };

            let mut src = ByteSource::new(reader);
            lex(&mut src, strategy, positions, &mut out)?;
            src.finish()
                .with_context(|| format!("Error reading {}", file.display()))?;
        } else {
            let text = if is_stdin(&file) {
                io::read_to_string(io::stdin().lock()).context("Error reading standard input")?
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("Error reading {}", file.display()))?
            };

            lex(StrSource::new(&text), strategy, positions, &mut out)?;
        }

        out.flush().context("Error flushing output")
    }

    fn lex<S: CharSource>(
        src: S,
        strategy: Strategy,
        positions: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut tokenizer =
            Tokenizer::new(src, strategy).context("Error building token automata")?;
        let mut count = 0_usize;
        let mut unknown = 0_usize;

        loop {
            let Spanned { pos, token } = tokenizer.next_spanned();

            if positions {
                write!(out, "{pos}\t")?;
            }
            writeln!(out, "{}\t{:?}", token.kind(), token.text())?;

            match token.kind() {
                TokenKind::EndOfStream => break,
                TokenKind::Unknown => unknown += 1,
                _ => (),
            }
            count += 1;
        }

        if unknown > 0 {
            tracing::warn!("{unknown} symbol(s) matched no token");
        }
        tracing::info!(
            count,
            unknown,
            scanned = tokenizer.symbols_scanned(),
            end = %tokenizer.position(),
            "Done"
        );

        Ok(())
    }
}
