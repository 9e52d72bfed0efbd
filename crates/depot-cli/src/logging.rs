use std::io::{self, Write};

use nu_ansi_term::Color::{Blue, Red, Yellow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Plain console format: the message with a colored level tag, untagged for `info!`.
pub struct ConsoleFormat;

fn level_tag(level: &Level) -> Option<Colored<&'static str>> {
    match *level {
        Level::INFO => None,
        Level::WARN => Some(Colored(Yellow, "[WARN]")),
        Level::ERROR => Some(Colored(Red, "[ERROR]")),
        // debug and trace share the verbose tag
        _ => Some(Colored(Blue, "[DEBUG]")),
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if let Some(tag) = level_tag(event.metadata().level()) {
            write!(writer, "{tag} ")?;
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Sends `info!` output to stdout and everything else to stderr.
struct WriterBuilder;

enum StdWriter {
    Out(io::Stdout),
    Err(io::Stderr),
}

impl Write for StdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdWriter::Out(out) => out.write(buf),
            StdWriter::Err(err) => err.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdWriter::Out(out) => out.flush(),
            StdWriter::Err(err) => err.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for WriterBuilder {
    type Writer = StdWriter;

    fn make_writer(&'a self) -> Self::Writer {
        StdWriter::Out(io::stdout())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        if meta.level() == &Level::INFO {
            StdWriter::Out(io::stdout())
        } else {
            StdWriter::Err(io::stderr())
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub fn setup_logging(args: &Args) {
    let filter_level = filter_level(args);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("depot={filter_level}"))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(WriterBuilder)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(ConsoleFormat).finish())
    };

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {err}");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_filter_level() {
        let parse = |argv: &[&str]| filter_level(&Args::parse_from(argv));
        assert_eq!(parse(&["depot", "list"]), Level::INFO);
        assert_eq!(parse(&["depot", "-v", "list"]), Level::DEBUG);
        assert_eq!(parse(&["depot", "-vvv", "list"]), Level::TRACE);
        assert_eq!(parse(&["depot", "-q", "-v", "list"]), Level::ERROR);
    }

    #[test]
    fn test_level_tag() {
        assert!(level_tag(&Level::INFO).is_none());
        assert_eq!(level_tag(&Level::WARN).map(|tag| tag.1), Some("[WARN]"));
        assert_eq!(level_tag(&Level::ERROR).map(|tag| tag.1), Some("[ERROR]"));
        assert_eq!(level_tag(&Level::TRACE).map(|tag| tag.1), Some("[DEBUG]"));
    }
}
