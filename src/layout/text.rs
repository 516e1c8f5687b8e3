use crate::config::WrapMode;
use crate::text_metrics::{FontRole, FontSet, VerticalMetrics};

use super::TextBlock;

/// Wraps `text` and measures the resulting block.
///
/// `height = line_height * n + line_spacing * (n - 1)`; `width` is the widest
/// line.
pub fn layout_wrapped_block(
    text: &str,
    role: FontRole,
    font_size: f32,
    wrap_width: usize,
    line_spacing: f32,
    fonts: &FontSet,
    wrap_mode: WrapMode,
) -> TextBlock {
    let mut lines = Vec::new();
    for paragraph in split_lines(text) {
        let wrapped = match wrap_mode {
            WrapMode::Chars => wrap_line_chars(&paragraph, wrap_width),
            WrapMode::Pixels => {
                let max_width =
                    wrap_width.max(1) as f32 * average_char_width(fonts, role, font_size);
                wrap_line(&paragraph, max_width, |candidate| {
                    text_width(fonts, role, candidate, font_size)
                })
            }
        };
        lines.extend(wrapped);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let line_widths: Vec<f32> = lines
        .iter()
        .map(|line| text_width(fonts, role, line, font_size))
        .collect();
    let metrics = vertical_metrics(fonts, role, font_size);
    let line_height = metrics.line_height();
    let count = lines.len() as f32;
    let height = line_height * count + line_spacing.max(0.0) * (count - 1.0);
    let width = line_widths.iter().copied().fold(0.0, f32::max);

    TextBlock {
        lines,
        line_widths,
        line_height,
        ascent: metrics.ascent,
        line_spacing: line_spacing.max(0.0),
        font_size,
        width,
        height,
    }
}

pub fn text_width(fonts: &FontSet, role: FontRole, text: &str, font_size: f32) -> f32 {
    fonts
        .measure_width(role, text, font_size)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub fn vertical_metrics(fonts: &FontSet, role: FontRole, font_size: f32) -> VerticalMetrics {
    fonts
        .vertical_metrics(role, font_size)
        .unwrap_or(VerticalMetrics {
            ascent: font_size * 0.8,
            descent: font_size * 0.2,
        })
}

fn average_char_width(fonts: &FontSet, role: FontRole, font_size: f32) -> f32 {
    fonts
        .average_char_width(role, font_size)
        .unwrap_or(font_size * 0.56)
}

pub(super) fn char_width_factor(ch: char) -> f32 {
    // Per-character advance as a fraction of the font size for a typical
    // sans-serif face; used when no font face is available.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        // CJK ideographs and fullwidth forms occupy a full em.
        '\u{2E80}'..='\u{9FFF}' | '\u{AC00}'..='\u{D7AF}' | '\u{FF00}'..='\u{FFEF}' => 1.0,
        _ => 0.568,
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f32>()
        * font_size
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace("\\n", "\n");
    normalized
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Greedy wrap to at most `width` characters per line. Words longer than
/// `width` are split, so text without spaces (e.g. CJK) still wraps.
pub(super) fn wrap_line_chars(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len <= width {
            current.push_str(word);
            current_len = word_len;
            continue;
        }
        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(width).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current_len = chunk.len();
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Greedy wrap on measured width.
pub(super) fn wrap_line(line: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    if measure(line) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure(word) <= max_width {
            current.push_str(word);
            continue;
        }
        for ch in word.chars() {
            let mut next = current.clone();
            next.push(ch);
            if !current.is_empty() && measure(&next) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = next;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
