use crate::render::{type_name_of, Render, RenderError, Side};
use crate::style::{Styler, Tone};

/// Builds the multi-line comparison shown when an assertion fails:
///
/// ```text
///
///   <actual> <op>
///   <expected>
///
/// <note>
/// ```
pub fn equality_msg<A, B>(
    styler: &Styler,
    op: &str,
    actual: &A,
    expected: &B,
    note: Option<&str>,
) -> Result<String, RenderError>
where
    A: Render + ?Sized,
    B: Render + ?Sized,
{
    let fmta = format_operand(styler, actual, Side::Actual, Tone::Actual)?;
    let fmtb = format_operand(styler, expected, Side::Expected, Tone::Expected)?;

    let note_line = match note {
        Some(note) if !note.is_empty() => format!("\n{}", styler.paint(note, Tone::Note)),
        _ => String::new(),
    };

    Ok([
        format!("\n  {} {}", fmta, styler.paint(op, Tone::Operator)),
        format!("  {}", fmtb),
        note_line,
    ]
    .join("\n"))
}

fn format_operand<T: Render + ?Sized>(
    styler: &Styler,
    value: &T,
    side: Side,
    tone: Tone,
) -> Result<String, RenderError> {
    let repr = value.repr();
    let painted = styler.paint(&repr, tone);
    match value.plain() {
        None => Ok(painted),
        Some(Ok(plain)) if plain != repr => Ok(format!("{} ({})", painted, plain)),
        Some(Ok(_)) => Ok(painted),
        Some(Err(_)) => Err(RenderError::Display {
            side,
            type_name: type_name_of(value),
            repr,
        }),
    }
}
