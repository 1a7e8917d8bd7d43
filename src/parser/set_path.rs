//! Argument rules for `set <directory> [<filename>]`
//!
//! Each argument is either a bare word or a double-quoted string that may
//! contain spaces. Arguments are separated by a single space (input is
//! whitespace-collapsed before it gets here). Anything else, such as an
//! unbalanced quote, an empty `""`, a quote glued to other text, or more than
//! two arguments, is rejected so the whole line can be read as a new task.

/// Directory and optional filename of a `set` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPathArgs {
    pub directory: String,
    pub filename: Option<String>,
}

/// Parses the text following `set `
pub fn parse_set_path_args(args: &str) -> Option<SetPathArgs> {
    let mut tokens: Vec<&str> = Vec::new();
    let mut rest = args;

    while !rest.is_empty() {
        let (token, remainder) = match rest.strip_prefix('"') {
            Some(quoted) => {
                let close = quoted.find('"')?;
                (&quoted[..close], &quoted[close + 1..])
            }
            None => {
                let end = rest.find(' ').unwrap_or(rest.len());
                (&rest[..end], &rest[end..])
            }
        };

        if token.is_empty() || token.contains('"') {
            return None;
        }
        tokens.push(token);

        rest = if remainder.is_empty() {
            remainder
        } else {
            // The next argument must start after exactly one separating space
            match remainder.strip_prefix(' ') {
                Some(next) if !next.is_empty() && !next.starts_with(' ') => next,
                _ => return None,
            }
        };
    }

    match tokens.as_slice() {
        [directory] => Some(SetPathArgs {
            directory: directory.to_string(),
            filename: None,
        }),
        [directory, filename] => Some(SetPathArgs {
            directory: directory.to_string(),
            filename: Some(filename.to_string()),
        }),
        _ => None,
    }
}
