use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

/// Compact symbol-per-level event format for terminal output.
pub struct WolFormatter;

impl<S, N> FormatEvent<S, N> for WolFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let symbol: ColoredString = match *event.metadata().level() {
            Level::TRACE => "[ ]".dimmed(),
            Level::DEBUG => "[?]".blue(),
            Level::INFO => "[+]".green().bold(),
            Level::WARN => "[*]".yellow().bold(),
            Level::ERROR => "[-]".red().bold(),
        };

        write!(writer, "{symbol} ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the tracing subscriber on stderr, so diagnostics never mix with
/// the command output on stdout. Quiet by default; `RUST_LOG` opens it up.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(WolFormatter)
        .init();
}
