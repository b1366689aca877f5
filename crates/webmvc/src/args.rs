
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("Flag -{} is missing an argument", .0)]
    MissingArg(String),
    #[error("Flag -{} expects a number, got {:?}", .0, .1)]
    InvalidNumber(String, String),
    #[error("Unknown flag -{}", .0)]
    UnknownFlag(String),
    #[error("Unexpected positional argument {:?}", .0)]
    UnexpectedPositional(String),
}

/// Parse a required parameter for an option, either inline or as the next arg
pub fn parse_param(
    flag: &str, args: &mut impl Iterator<Item = String>, inline: Option<&str>
) -> Result<String, ArgError> {
    match inline {
        Some(v) => Ok(v.into()),
        None => args.next().ok_or_else(|| ArgError::MissingArg(flag.into())),
    }
}

/// Parse a required numeric parameter, see [`parse_param`]
pub fn parse_number<T: std::str::FromStr>(
    flag: &str, args: &mut impl Iterator<Item = String>, inline: Option<&str>
) -> Result<T, ArgError> {
    let value = parse_param(flag, args, inline)?;
    value.parse().map_err(|_| ArgError::InvalidNumber(flag.into(), value))
}

/// Walk `args` (including argv[0]), calling `handle_flag` for `-flag[=inline]`
/// and `handle_pos` for everything else. A bare `--` ends flag parsing.
/// Returns `Ok(None)` if a callback asked to stop early.
pub fn parse_args<I, F, P, E>(
    mut args: I,
    mut handle_flag: F,
    mut handle_pos: P,
) -> Result<Option<()>, E>
where
    I: Iterator<Item = String>,
    F: FnMut(&str, Option<&str>, &mut I, &str) -> Result<Option<()>, E>,
    P: FnMut(usize, String) -> Result<Option<()>, E>,
{
    let mut in_flags = true;
    let mut pos_index = 0;
    let arg0 = args.next().unwrap_or_else(|| "unknown".into());

    while let Some(arg) = args.next() {
        if in_flags && arg.starts_with('-') {
            let (flag, inline) = match arg[1..].split_once('=') {
                Some((flag, inline)) => (flag, Some(inline)),
                None => (&arg[1..], None),
            };

            if flag == "-" && inline.is_none() {
                in_flags = false;
            } else if handle_flag(flag, inline, &mut args, &arg0)?.is_none() {
                return Ok(None);
            }
        } else {
            if handle_pos(pos_index, arg)?.is_none() { return Ok(None); }
            pos_index += 1;
        }
    }

    Ok(Some(()))
}
