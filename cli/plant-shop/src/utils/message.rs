use std::fmt::Display;

/// Leading symbol of a message, emoji are double width and get an extra space.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Plain,
    Error,
    Created,
    Deleted,
    Updated,
    Warning,
}

impl Kind {
    fn prefix(self) -> &'static str {
        match self {
            Kind::Plain => "",
            Kind::Error => "❌ ERROR: ",
            Kind::Created => "✨ ",
            Kind::Deleted => "🗑️  ",
            Kind::Updated => "✅ ",
            Kind::Warning => "⚠️  ",
        }
    }
}

/// Write a message to stderr.
///
/// Everything the storefront tells the user, apart from the catalog itself,
/// goes through here so stdout stays clean for `--json` output.
fn print_message(kind: Kind, v: impl Display) {
    let message = format!("{}{v}", kind.prefix());

    #[cfg(test)]
    crate::utils::message::history::History::global().push_message(message.clone());

    eprintln!("{message}");
}

/// Informational output, such as search summaries.
pub(crate) fn plain(v: impl Display) {
    print_message(Kind::Plain, v);
}
pub(crate) fn error(v: impl Display) {
    print_message(Kind::Error, v);
}
/// A plant was added to the catalog.
pub(crate) fn created(v: impl Display) {
    print_message(Kind::Created, v);
}
pub(crate) fn deleted(v: impl Display) {
    print_message(Kind::Deleted, v);
}
/// A plant was edited or sold.
pub(crate) fn updated(v: impl Display) {
    print_message(Kind::Updated, v);
}
pub(crate) fn warning(v: impl Display) {
    print_message(Kind::Warning, v);
}
