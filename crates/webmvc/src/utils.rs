// Adapted from anyhow's debug formatter
struct Indented<'a, T> {
    inner: &'a mut T,
    indent: usize,
    prefix: Option<&'a str>,
}

impl<'a, T> std::fmt::Write for Indented<'a, T> where T: std::fmt::Write {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let mut first_segment = true;
        for line in s.split('\n') {
            if let Some(prefix) = self.prefix.take() {
                write!(self.inner, "{:>width$}", prefix, width=self.indent)?;
            } else if !first_segment {
                self.inner.write_char('\n')?;
                write!(self.inner, "{:>width$}", "", width=self.indent)?;
            }
            self.inner.write_str(line)?;
            first_segment = false;
        }
        Ok(())
    }
}

/// Write `error` followed by its numbered `source()` chain.
pub fn format_error<E, W>(f: &mut W, error: &E) -> Result<(), std::fmt::Error> where W: std::fmt::Write, E: std::error::Error + ?Sized {
    use std::fmt::Write;
    write!(f, "{}", error)?;

    let mut next_cause = error.source();
    if next_cause.is_some() {
        write!(f, "\n\nCaused by:")?;
    }
    let mut n = 0;
    while let Some(cause) = next_cause {
        writeln!(f)?;
        let prefix = format!("{}: ", n);
        let mut indented = Indented { inner: &mut *f, indent: 7, prefix: Some(&prefix) };
        write!(indented, "{}", cause)?;
        next_cause = cause.source();
        n += 1;
    }
    Ok(())
}

pub fn format_error_disp<'a, E>(e: &'a E) -> impl std::fmt::Display + 'a where E: std::error::Error + ?Sized {
    struct Disp<'a, E: ?Sized>(&'a E);
    impl<E> std::fmt::Display for Disp<'_, E> where E: std::error::Error + ?Sized {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            format_error(f, self.0)
        }
    }
    Disp(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DispatchError, HandlerError};

    #[test]
    fn formats_cause_chain() {
        let error = DispatchError::Handler {
            handler: "greet".into(),
            source: HandlerError::illegal_state("boom"),
        };
        assert_eq!(
            format_error_disp(&error).to_string(),
            "Handler greet failed\n\nCaused by:\n    0: boom",
        );
        assert_eq!(format_error_disp(&HandlerError::AsyncTimeout).to_string(), "Asynchronous request timed out");
    }
}
