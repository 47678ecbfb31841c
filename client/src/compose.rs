//! Message input clean-up before `sendMessage`.

/// Prepares a typed message for sending.
///
/// Leading whitespace is dropped and any run of three or more whitespace
/// characters becomes two spaces. Returns `None` when nothing is left to send.
pub fn sanitize_message_input(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut run = String::new();
    for c in trimmed.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_whitespace(&mut out, &mut run);
        out.push(c);
    }
    flush_whitespace(&mut out, &mut run);
    Some(out)
}

fn flush_whitespace(out: &mut String, run: &mut String) {
    if run.chars().count() >= 3 {
        out.push_str("  ");
    } else {
        out.push_str(run);
    }
    run.clear();
}
