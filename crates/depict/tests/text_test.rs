use depict::text::{cut_last_line, estimate_lines, separate_text_into_lines};

/// Every char is one unit wide; widths are capped at `max + 1` so overflow is
/// still visible.
fn mock_width(max: usize) -> impl FnMut(&str, usize, Option<usize>) -> f32 {
    move |text: &str, start: usize, end: Option<usize>| {
        let len = text[start..end.unwrap_or(text.len())].chars().count();
        len.min(max + 1) as f32
    }
}

#[test]
fn test_cut_returns_full_text_when_it_fits() {
    let line = cut_last_line("hello", 10.0, 0, &mut mock_width(10), false, false);
    assert_eq!(line, "hello");
}

#[test]
fn test_cut_never_adds_ellipsis_to_fitting_text() {
    let line = cut_last_line("abc", 3.0, 0, &mut mock_width(3), false, true);
    assert_eq!(line, "abc");
}

#[test]
fn test_cut_adds_ellipsis_when_needed() {
    let line = cut_last_line("hello world", 5.0, 0, &mut mock_width(5), false, true);
    assert!(line.ends_with("..."));
    assert_eq!(line, "hello...");
}

#[test]
fn test_cut_from_inside_a_char_starts_at_the_next_one() {
    // Byte 2 is the middle of 'é'.
    let line = cut_last_line("héllo", 10.0, 2, &mut mock_width(10), false, false);
    assert_eq!(line, "llo");

    let line = cut_last_line("héllo", 10.0, 99, &mut mock_width(10), false, true);
    assert_eq!(line, "");
}

#[test]
fn test_cut_at_word_boundary() {
    let line = cut_last_line("hello world", 5.0, 0, &mut mock_width(5), true, false);
    assert_eq!(line, "hello");

    let line = cut_last_line("hi there", 5.0, 0, &mut mock_width(5), true, false);
    assert_eq!(line, "hi");
}

#[test]
fn test_cut_from_offset() {
    let line = cut_last_line("hello world", 5.0, 6, &mut mock_width(5), false, false);
    assert_eq!(line, "world");
}

#[test]
fn test_split_into_multiple_lines() {
    let lines = separate_text_into_lines("hello world again", 5.0, &mut mock_width(5), 2, false, false);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].len() <= 6);
    assert_eq!(lines[0], "hello");
}

#[test]
fn test_split_trims_leading_spaces() {
    let lines = separate_text_into_lines("hello   world", 5.0, &mut mock_width(5), 2, false, false);
    assert!(lines[1].starts_with("world"));
}

#[test]
fn test_split_ellipsis_on_last_line_only() {
    let lines = separate_text_into_lines("hello world again", 5.0, &mut mock_width(5), 2, false, true);
    assert_eq!(lines, vec!["hello".to_string(), "world...".to_string()]);

    let lines = separate_text_into_lines(
        "aaaaa bbbbb ccccc ddddd",
        5.0,
        &mut mock_width(5),
        3,
        false,
        true,
    );
    assert_eq!(lines.len(), 3);
    assert!(!lines[0].ends_with("..."));
    assert!(!lines[1].ends_with("..."));
    assert!(lines[2].ends_with("..."));
}

#[test]
fn test_split_word_based() {
    let lines = separate_text_into_lines("hello world again", 5.0, &mut mock_width(5), 2, true, false);
    assert_eq!(lines.len(), 2);

    let lines = separate_text_into_lines("hi there", 5.0, &mut mock_width(5), 5, true, false);
    assert_eq!(lines, vec!["hi".to_string(), "there".to_string()]);
}

#[test]
fn test_split_stops_when_text_is_used_up() {
    let lines = separate_text_into_lines("hi there", 5.0, &mut mock_width(5), 5, false, false);
    assert_eq!(lines, vec!["hi th".to_string(), "ere".to_string()]);
}

#[test]
fn test_split_lines_fit_the_width() {
    let text = "the quick brown fox jumps over the lazy dog";
    let lines = separate_text_into_lines(text, 7.0, &mut mock_width(7), 4, true, false);
    assert_eq!(lines.len(), 4);
    for line in &lines {
        assert!(line.chars().count() <= 7, "{line:?} is too wide");
    }
}

#[test]
fn test_split_zero_lines_is_empty() {
    let lines = separate_text_into_lines("hello", 5.0, &mut mock_width(5), 0, false, true);
    assert!(lines.is_empty());
}

#[test]
fn test_split_multibyte_text() {
    let lines = separate_text_into_lines("héllo wörld", 5.0, &mut mock_width(5), 2, false, false);
    assert_eq!(lines, vec!["héllo".to_string(), "wörld".to_string()]);
}

#[test]
fn test_measure_is_called_logarithmically() {
    let text = "x".repeat(1024);
    let mut calls = 0;
    let mut measure = |t: &str, s: usize, e: Option<usize>| -> f32 {
        calls += 1;
        (e.unwrap_or(t.len()) - s) as f32
    };
    let line = cut_last_line(&text, 100.0, 0, &mut measure, false, false);
    assert_eq!(line.len(), 100);
    assert!(calls <= 16, "{calls} measurements");
}

#[test]
fn test_estimate_lines() {
    assert_eq!(estimate_lines(17.0, 18.0), 0);
    assert_eq!(estimate_lines(18.0, 18.0), 1);
    assert_eq!(estimate_lines(100.0, 18.0), 5);
}
