//! Command-line splitting using the Windows shell quoting convention.
//!
//! Arguments are separated by unquoted spaces. A `"` toggles quoting. A run
//! of backslashes is literal unless it is followed by a `"`, in which case
//! every pair becomes one backslash and an odd leftover escapes the quote.

use std::iter;

/// Split a raw command line into decoded arguments.
///
/// Never fails: an unterminated quote simply closes at the end of the text.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = raw.chars().peekable();

    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        if chars.peek().is_none() {
            return args;
        }

        let mut arg = String::new();
        let mut quoting = false;
        let mut backslashes = 0usize;
        loop {
            let ch = chars.next();
            if ch == Some('\\') {
                backslashes += 1;
                continue;
            }
            if ch == Some('"') {
                arg.extend(iter::repeat('\\').take(backslashes / 2));
                backslashes %= 2;
            } else {
                arg.extend(iter::repeat('\\').take(backslashes));
                backslashes = 0;
            }
            match ch {
                None => {
                    args.push(arg);
                    return args;
                }
                Some(' ') if !quoting => {
                    args.push(arg);
                    break;
                }
                Some('"') if backslashes == 0 => quoting = !quoting,
                Some(c) => {
                    arg.push(c);
                    backslashes = 0;
                }
            }
        }
    }
}

/// Quote a single argument so that [`tokenize`] yields it back unchanged.
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '"']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }
    let mut backslashes = 0usize;
    for ch in arg.chars() {
        if ch == '\\' {
            backslashes += 1;
        } else {
            if ch == '"' {
                out.extend(iter::repeat('\\').take(backslashes + 1));
            }
            backslashes = 0;
        }
        out.push(ch);
    }
    if needs_quotes {
        out.extend(iter::repeat('\\').take(backslashes));
        out.push('"');
    }
    out
}

/// Build a raw command line from already separated arguments.
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip the program name from a full process command line, leaving the
/// argument text the way the shell hands it to a GUI entry point.
///
/// A quoted program name runs to the next quote. An unquoted one runs to the
/// first space or tab. Blanks after it are skipped.
pub fn skip_program_name(full: &str) -> &str {
    let rest = match full.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(end) => &quoted[end + 1..],
            None => "",
        },
        None => full.trim_start_matches(|c: char| c != ' ' && c != '\t'),
    };
    rest.trim_start_matches([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_trailing_backslash_is_doubled() {
        assert_eq!(quote_arg(r"C:\My Docs\"), r#""C:\My Docs\\""#);
        assert_eq!(tokenize(&quote_arg(r"C:\My Docs\")), vec![r"C:\My Docs\"]);
    }

    #[test]
    fn program_name_is_stripped() {
        assert_eq!(skip_program_name(r#""C:\Program Files\l.exe" -Embedding"#), "-Embedding");
        assert_eq!(skip_program_name("l.exe   a.pdf b.pdf"), "a.pdf b.pdf");
        assert_eq!(skip_program_name("l.exe"), "");
        assert_eq!(skip_program_name(r#""unterminated"#), "");
    }

    #[test]
    fn plain_argument_is_left_alone() {
        assert_eq!(quote_arg(r"C:\a.pdf"), r"C:\a.pdf");
        assert_eq!(quote_arg(""), r#""""#);
    }
}
