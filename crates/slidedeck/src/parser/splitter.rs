use super::is_directive;

/// Split a deck body (frontmatter already removed) into raw slide texts.
///
/// A slide ends at:
/// 1. a `---` line with a blank line (or the start/end of input) on both sides
/// 2. three or more consecutive blank lines
/// 3. a `# ` heading once the current slide has content
///
/// Nothing inside a fenced code block ever ends a slide.
pub fn split(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut blank_run = 0;

    for (i, &line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some((fence_char, fence_len)) = fence {
            if closes_fence(trimmed, fence_char, fence_len) {
                fence = None;
            }
            current.push(line);
            continue;
        }

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                flush(&mut current, &mut slides);
            }
            current.push(line);
            continue;
        }

        let after_blank = blank_run > 0 || current.iter().all(|l| l.trim().is_empty());
        let before_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
        blank_run = 0;

        if is_dash_separator(trimmed) && after_blank && before_blank {
            flush(&mut current, &mut slides);
            continue;
        }

        if let Some(opened) = opens_fence(trimmed) {
            fence = Some(opened);
        } else if line.starts_with("# ") && has_content(&current) {
            // `@key: value` lines right above the heading belong to the new slide
            let carried = take_trailing_directives(&mut current);
            flush(&mut current, &mut slides);
            current = carried;
        }

        current.push(line);
    }

    flush(&mut current, &mut slides);
    slides
}

fn flush(current: &mut Vec<&str>, slides: &mut Vec<String>) {
    let text = current.join("\n").trim().to_string();
    current.clear();
    if !text.is_empty() {
        slides.push(text);
    }
}

fn has_content(lines: &[&str]) -> bool {
    lines.iter().any(|l| {
        let t = l.trim();
        !t.is_empty() && !is_directive(t)
    })
}

fn take_trailing_directives<'a>(current: &mut Vec<&'a str>) -> Vec<&'a str> {
    let keep = current
        .iter()
        .rposition(|l| {
            let t = l.trim();
            !t.is_empty() && !is_directive(t)
        })
        .map_or(0, |i| i + 1);
    current
        .split_off(keep)
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect()
}

pub(super) fn opens_fence(trimmed: &str) -> Option<(char, usize)> {
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == fence_char).count();
    (len >= 3).then_some((fence_char, len))
}

pub(super) fn closes_fence(trimmed: &str, fence_char: char, fence_len: usize) -> bool {
    let len = trimmed.chars().take_while(|&c| c == fence_char).count();
    len >= fence_len && trimmed.chars().skip(len).all(char::is_whitespace)
}

fn is_dash_separator(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_separator() {
        let slides = split("One\n\n---\n\nTwo");
        assert_eq!(slides, vec!["One", "Two"]);
    }

    #[test]
    fn test_dash_without_blank_lines_is_content() {
        let slides = split("One\n---\nTwo");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_blank_run_splits() {
        let slides = split("One\n\n\n\nTwo\n\nstill two");
        assert_eq!(slides, vec!["One", "Two\n\nstill two"]);
    }

    #[test]
    fn test_overlapping_separators_make_one_break() {
        let slides = split("One\n\n\n\n---\n\n\n\nTwo");
        assert_eq!(slides, vec!["One", "Two"]);
    }

    #[test]
    fn test_heading_starts_new_slide() {
        let slides = split("# First\n\nBody\n\n# Second\n\nMore");
        assert_eq!(slides.len(), 2);
        assert!(slides[0].starts_with("# First"));
        assert!(slides[1].starts_with("# Second"));
    }

    #[test]
    fn test_leading_heading_does_not_split() {
        let slides = split("@name: intro\n# Only\n\nBody\n\n## Sub");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_directives_move_with_heading() {
        let slides = split("# One\n\nBody\n\n@transition: fade\n@name: two\n# Two");
        assert_eq!(slides.len(), 2);
        assert!(!slides[0].contains('@'), "{}", slides[0]);
        assert_eq!(slides[1], "@transition: fade\n@name: two\n# Two");
    }

    #[test]
    fn test_code_fence_is_opaque() {
        let body = "# Code\n\n```python\n# comment\n\n\n\nprint(1)\n\n---\n\n```\n";
        let slides = split(body);
        assert_eq!(slides.len(), 1, "{slides:?}");
    }

    #[test]
    fn test_crlf_input() {
        let slides = split("One\r\n\r\n---\r\n\r\nTwo\r\n");
        assert_eq!(slides, vec!["One", "Two"]);
    }
}
