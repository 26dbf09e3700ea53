//! What `iom` needs to know about the terminal it writes to.
//!
//! Rule listings from `iom compile` and the sheet table from `iom sheets`
//! are coloured only when stdout is a colour-capable terminal, and the
//! separator under a sheet heading is sized to the window. Decision JSON
//! never goes through these helpers.

use std::env;

/// Width assumed when stdout is not a terminal.
const FALLBACK_WIDTH: usize = 80;

pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Terminal width in columns, or [`FALLBACK_WIDTH`] when it cannot be read.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .ok()
        .filter(|&cols| cols > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Whether rule listings and sheet tables get ANSI colour.
pub fn supports_color() -> bool {
    color_wanted(|name| env::var(name).ok(), is_tty())
}

/// `NO_COLOR` (<https://no-color.org/>), `CLICOLOR=0` and `TERM=dumb` turn
/// colour off; `CLICOLOR_FORCE` turns it on for pipes. Otherwise colour
/// follows `tty`.
fn color_wanted(var: impl Fn(&str) -> Option<String>, tty: bool) -> bool {
    if var("NO_COLOR").is_some()
        || var("CLICOLOR").as_deref() == Some("0")
        || var("TERM").as_deref() == Some("dumb")
    {
        return false;
    }
    var("CLICOLOR_FORCE").is_some() || tty
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn color_follows_the_tty_by_default() {
        assert!(color_wanted(env_of(&[]), true));
        assert!(!color_wanted(env_of(&[]), false));
    }

    #[test]
    fn opt_outs_beat_force() {
        assert!(!color_wanted(env_of(&[("NO_COLOR", "")]), true));
        assert!(!color_wanted(env_of(&[("CLICOLOR", "0")]), true));
        assert!(!color_wanted(
            env_of(&[("TERM", "dumb"), ("CLICOLOR_FORCE", "1")]),
            true
        ));
    }

    #[test]
    fn force_colours_a_pipe() {
        assert!(color_wanted(env_of(&[("CLICOLOR_FORCE", "1")]), false));
        assert!(color_wanted(env_of(&[("CLICOLOR", "1")]), true));
    }

    #[test]
    fn width_is_never_zero() {
        assert!(terminal_width() > 0);
    }
}
