use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::{IND_PLAYED, IND_UNPLAYED};

/// Cut `s` to at most `width` terminal columns, ending in `…` when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// `m:ss`, or `h:mm:ss` past an hour.
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// `#` for the played share of `width` cells, `-` for the rest.
pub fn progress_bar(width: usize, elapsed: u64, total: u64) -> String {
    let played = if total == 0 {
        0
    } else {
        ((elapsed.min(total) as u128 * width as u128) / total as u128) as usize
    };
    let mut bar = String::with_capacity(width);
    bar.extend(std::iter::repeat(IND_PLAYED).take(played));
    bar.extend(std::iter::repeat(IND_UNPLAYED).take(width - played));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Roygbiv", 10), "Roygbiv");
        assert_eq!(truncate("Music Has the Right to Children", 10), "Music Has…");
        assert_eq!(truncate("日本語のタイトル", 7), "日本語…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(383), "6:23");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(10, 0, 100), "----------");
        assert_eq!(progress_bar(10, 50, 100), "#####-----");
        assert_eq!(progress_bar(10, 500, 100), "##########");
        assert_eq!(progress_bar(4, 10, 0), "----");
    }
}
