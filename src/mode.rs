use std::iter::Peekable;

/// How this process was asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Open the files named on the command line and exit.
    OneShot,
    /// Register as a drop-target server and stay resident.
    ResidentServer,
}

impl LaunchMode {
    pub fn detect(raw: &str) -> Self {
        if is_server_mode(raw) {
            LaunchMode::ResidentServer
        } else {
            LaunchMode::OneShot
        }
    }
}

const FLAG: &str = "embedding";

/// Returns `true` when the raw command line is nothing but the embedding flag.
///
/// Quotes anywhere around or inside the flag are ignored, so `"-emb"edding`
/// still counts. Either `-` or `/` may introduce the flag and the letters are
/// matched case-insensitively. Anything other than trailing spaces after the
/// flag, or an unbalanced quote, rejects server mode.
pub fn is_server_mode(raw: &str) -> bool {
    let mut chars = raw.chars().skip_while(|&c| c == ' ').peekable();
    if chars.peek().is_none() {
        return false;
    }

    let mut quoting = false;
    skip_quotes(&mut chars, &mut quoting);
    if !matches!(chars.next(), Some('-' | '/')) {
        return false;
    }
    for expected in FLAG.chars() {
        skip_quotes(&mut chars, &mut quoting);
        match chars.next() {
            Some(c) if c.eq_ignore_ascii_case(&expected) => {}
            _ => return false,
        }
    }
    skip_quotes(&mut chars, &mut quoting);

    if quoting {
        return false;
    }
    chars.all(|c| c == ' ')
}

fn skip_quotes<I: Iterator<Item = char>>(chars: &mut Peekable<I>, quoting: &mut bool) {
    while chars.next_if_eq(&'"').is_some() {
        *quoting = !*quoting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_maps_to_modes() {
        assert_eq!(LaunchMode::detect("-Embedding"), LaunchMode::ResidentServer);
        assert_eq!(LaunchMode::detect("a.pdf"), LaunchMode::OneShot);
    }

    #[test]
    fn prefix_of_flag_is_not_enough() {
        assert!(!is_server_mode("-embed"));
        assert!(!is_server_mode("-embeddings"));
    }
}
