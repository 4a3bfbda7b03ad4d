use std::collections::HashMap;

use timechart_core::{
    add_step, ceil_to_step, format_hm, minutes_between, parse_time, ChartData, ChartError,
    ChartOptions, GroupOrder, RawLine, RawSlice, TimelineChart, UNKNOWN_LEGEND,
};

fn slice(legend: &str, start: &str, end: &str) -> RawSlice {
    RawSlice {
        legend: legend.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn line(name: &str, slices: Vec<RawSlice>) -> RawLine {
    RawLine {
        name: name.to_string(),
        slices,
    }
}

fn dataset(lines: Vec<RawLine>) -> ChartData {
    ChartData {
        legends: Vec::new(),
        lines,
    }
}

fn chart(lines: Vec<RawLine>) -> TimelineChart {
    TimelineChart::new(dataset(lines), &ChartOptions::default())
        .expect("Không dựng được chart từ dataset mẫu")
}

fn segment_view(chart: &TimelineChart, line: &str) -> Vec<(String, String, String)> {
    chart
        .line(line)
        .expect("Không tìm thấy line")
        .segments
        .iter()
        .map(|segment| {
            (
                segment.legend.clone(),
                format_hm(segment.start),
                format_hm(segment.end),
            )
        })
        .collect()
}

#[test]
fn parse_and_format_round_trip() {
    for value in ["00:00", "09:05", "12:30", "23:59"] {
        let time = parse_time(value).expect("Không đọc được mốc hợp lệ");
        assert_eq!(format_hm(time), value);
        assert_eq!(parse_time(&format_hm(time)).unwrap(), time);
    }
}

#[test]
fn parse_time_rejects_malformed_input() {
    for value in ["", "9h30", "09", "09:30:00", "24:00", "09:60", "ab:cd", "-1:00"] {
        let err = parse_time(value).expect_err("Chuỗi hỏng phải bị từ chối");
        assert!(matches!(err, ChartError::Parse(_)), "{value} -> {err}");
    }
}

#[test]
fn minutes_between_is_symmetric() {
    let pairs = [("09:00", "10:30"), ("00:00", "23:59"), ("12:00", "12:00")];
    for (a, b) in pairs {
        let a = parse_time(a).unwrap();
        let b = parse_time(b).unwrap();
        assert_eq!(minutes_between(a, b), minutes_between(b, a));
    }
    assert_eq!(
        minutes_between(parse_time("09:00").unwrap(), parse_time("10:30").unwrap()),
        90
    );
}

#[test]
fn ceil_to_step_keeps_exact_multiples_and_is_idempotent() {
    let on_step = parse_time("09:00").unwrap();
    assert_eq!(ceil_to_step(on_step, 30), on_step);

    let off_step = parse_time("09:10").unwrap();
    let rounded = ceil_to_step(off_step, 30);
    assert_eq!(format_hm(rounded), "09:30");
    assert_eq!(ceil_to_step(rounded, 30), rounded);

    // Phút 45 với step 30 dồn sang giờ kế tiếp.
    let late = parse_time("09:45").unwrap();
    assert_eq!(format_hm(ceil_to_step(late, 30)), "10:00");
}

#[test]
fn add_step_advances_by_minutes() {
    let time = parse_time("09:45").unwrap();
    assert_eq!(format_hm(add_step(time, 30)), "10:15");
}

#[test]
fn normalized_line_gets_trailing_unknown() {
    let chart = chart(vec![
        line(
            "first",
            vec![slice("A", "09:00", "10:00"), slice("B", "10:00", "11:30")],
        ),
        line("second", vec![slice("C", "09:00", "12:00")]),
    ]);

    assert_eq!(
        segment_view(&chart, "first"),
        vec![
            ("A".to_string(), "09:00".to_string(), "10:00".to_string()),
            ("B".to_string(), "10:00".to_string(), "11:30".to_string()),
            (
                UNKNOWN_LEGEND.to_string(),
                "11:30".to_string(),
                "12:00".to_string()
            ),
        ]
    );
}

#[test]
fn later_starting_line_gets_leading_unknown() {
    let chart = chart(vec![
        line("line1", vec![slice("A", "09:00", "10:00")]),
        line("line2", vec![slice("B", "09:30", "10:00")]),
    ]);

    assert_eq!(
        segment_view(&chart, "line2"),
        vec![
            (
                UNKNOWN_LEGEND.to_string(),
                "09:00".to_string(),
                "09:30".to_string()
            ),
            ("B".to_string(), "09:30".to_string(), "10:00".to_string()),
        ]
    );
}

#[test]
fn mid_line_gap_is_filled_with_unknown() {
    let chart = chart(vec![line(
        "only",
        vec![slice("A", "09:00", "10:00"), slice("B", "10:30", "11:00")],
    )]);

    assert_eq!(
        segment_view(&chart, "only"),
        vec![
            ("A".to_string(), "09:00".to_string(), "10:00".to_string()),
            (
                UNKNOWN_LEGEND.to_string(),
                "10:00".to_string(),
                "10:30".to_string()
            ),
            ("B".to_string(), "10:30".to_string(), "11:00".to_string()),
        ]
    );
}

#[test]
fn contiguous_segments_get_no_zero_width_filler() {
    let chart = chart(vec![line(
        "only",
        vec![slice("A", "09:00", "10:00"), slice("B", "10:00", "11:00")],
    )]);

    assert_eq!(chart.line("only").unwrap().segments.len(), 2);
}

#[test]
fn every_normalized_line_is_contiguous() {
    let chart = chart(vec![
        line(
            "first",
            vec![slice("A", "09:15", "10:00"), slice("B", "10:30", "11:30")],
        ),
        line("second", vec![slice("C", "09:00", "12:00")]),
        line("third", vec![slice("A", "10:00", "11:00")]),
    ]);

    for line in chart.lines() {
        for pair in line.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "line {} đứt quãng", line.name);
        }
    }
}

#[test]
fn inverted_segment_is_rejected() {
    let err = TimelineChart::new(
        dataset(vec![line("only", vec![slice("A", "10:00", "09:00")])]),
        &ChartOptions::default(),
    )
    .expect_err("Đoạn ngược phải bị từ chối");

    assert!(matches!(err, ChartError::InvertedSegment { .. }), "{err}");
}

#[test]
fn out_of_order_segments_are_rejected() {
    let err = TimelineChart::new(
        dataset(vec![line(
            "only",
            vec![slice("A", "10:00", "11:00"), slice("B", "09:00", "09:30")],
        )]),
        &ChartOptions::default(),
    )
    .expect_err("Đoạn sai trình tự phải bị từ chối");

    assert!(matches!(err, ChartError::NonSequential { .. }), "{err}");
}

#[test]
fn empty_dataset_is_rejected() {
    let err = TimelineChart::new(dataset(Vec::new()), &ChartOptions::default())
        .expect_err("Dataset rỗng phải bị từ chối");
    assert!(matches!(err, ChartError::EmptyDataset), "{err}");

    let err = TimelineChart::new(
        dataset(vec![line("only", Vec::new())]),
        &ChartOptions::default(),
    )
    .expect_err("Dataset toàn line rỗng phải bị từ chối");
    assert!(matches!(err, ChartError::EmptyDataset), "{err}");
}

#[test]
fn empty_line_stays_empty_after_normalization() {
    let chart = chart(vec![
        line("busy", vec![slice("A", "09:00", "10:00")]),
        line("idle", Vec::new()),
    ]);

    assert_eq!(chart.count_lines(), 2);
    assert!(chart.line("idle").unwrap().segments.is_empty());
}

#[test]
fn zero_length_span_cannot_derive_scale() {
    let err = TimelineChart::new(
        dataset(vec![line("only", vec![slice("A", "09:00", "09:00")])]),
        &ChartOptions::default(),
    )
    .expect_err("Khoảng 0 phút phải bị từ chối khi tính tỉ lệ");

    assert!(matches!(err, ChartError::DivisionByZero), "{err}");
}

#[test]
fn scale_follows_width_over_span() {
    let mut chart = chart(vec![line(
        "only",
        vec![slice("A", "09:00", "10:00"), slice("B", "10:00", "15:40")],
    )]);

    assert_eq!(chart.all_minutes(), 400);
    chart.set_width(800).expect("Không đặt được bề rộng");
    assert_eq!(chart.minute_width(), 2.0);
    assert_eq!(chart.width(), 800);

    // 300px / 400 phút cho tỉ lệ lẻ, vẫn giữ đúng 2 chữ số thập phân.
    chart.set_width(300).expect("Không đặt được bề rộng");
    assert_eq!(chart.minute_width(), 0.75);
}

#[test]
fn group_by_legend_without_order_keeps_first_occurrence() {
    let chart = chart(vec![line(
        "only",
        vec![
            slice("A", "09:00", "09:30"),
            slice("B", "09:30", "09:45"),
            slice("A", "09:45", "10:45"),
        ],
    )]);

    let grouped = chart.group_by_legend(chart.line("only").unwrap(), None, None);
    let view: Vec<(&str, i64)> = grouped
        .iter()
        .map(|entry| (entry.legend.as_str(), entry.total_minutes))
        .collect();
    assert_eq!(view, vec![("A", 90), ("B", 15)]);
}

#[test]
fn group_by_legend_sorts_desc_and_asc() {
    let chart = chart(vec![line(
        "only",
        vec![
            slice("A", "09:00", "09:30"),
            slice("B", "09:30", "10:00"),
            slice("C", "10:00", "10:10"),
        ],
    )]);
    let only = chart.line("only").unwrap();

    let desc = chart.group_by_legend(only, Some(GroupOrder::Desc), None);
    let view: Vec<&str> = desc.iter().map(|entry| entry.legend.as_str()).collect();
    assert_eq!(view, vec!["A", "B", "C"]);

    let asc = chart.group_by_legend(only, Some(GroupOrder::Asc), None);
    let view: Vec<&str> = asc.iter().map(|entry| entry.legend.as_str()).collect();
    assert_eq!(view, vec!["C", "A", "B"]);
}

#[test]
fn legend_order_puts_unweighted_entries_last() {
    let chart = chart(vec![line(
        "only",
        vec![
            slice("A", "09:00", "09:30"),
            slice("B", "09:30", "10:00"),
            slice("C", "10:00", "10:10"),
        ],
    )]);

    let mut weights = HashMap::new();
    weights.insert("A".to_string(), 2);
    weights.insert("B".to_string(), 1);

    let grouped = chart.group_by_legend(
        chart.line("only").unwrap(),
        Some(GroupOrder::Legend),
        Some(&weights),
    );
    let view: Vec<&str> = grouped.iter().map(|entry| entry.legend.as_str()).collect();
    assert_eq!(view, vec!["A", "B", "C"]);
}

#[test]
fn legend_order_without_weights_keeps_all_entries() {
    let chart = chart(vec![line(
        "only",
        vec![slice("A", "09:00", "09:30"), slice("B", "09:30", "10:00")],
    )]);

    let grouped =
        chart.group_by_legend(chart.line("only").unwrap(), Some(GroupOrder::Legend), None);
    let mut legends: Vec<&str> = grouped.iter().map(|entry| entry.legend.as_str()).collect();
    legends.sort_unstable();
    assert_eq!(legends, vec!["A", "B"]);
}

#[test]
fn aggregate_sums_across_lines() {
    let chart = chart(vec![
        line("first", vec![slice("A", "09:00", "10:00")]),
        line("second", vec![slice("B", "09:00", "09:30")]),
    ]);

    let aggregated = chart.aggregate_across_lines(None);
    let view: Vec<(&str, i64)> = aggregated
        .iter()
        .map(|entry| (entry.legend.as_str(), entry.total_minutes))
        .collect();
    assert_eq!(view, vec![("A", 60), ("B", 30), (UNKNOWN_LEGEND, 30)]);
}

#[test]
fn set_data_replaces_dataset_wholesale() {
    let mut chart = chart(vec![line("first", vec![slice("A", "09:00", "10:00")])]);

    chart
        .set_data(dataset(vec![line(
            "other",
            vec![slice("B", "06:00", "08:00")],
        )]))
        .expect("Không thay được dataset");
    chart.set_width(240).expect("Không đặt được bề rộng");

    assert_eq!(format_hm(chart.start_time()), "06:00");
    assert_eq!(format_hm(chart.end_time()), "08:00");
    assert_eq!(chart.all_minutes(), 120);
    assert_eq!(chart.minute_width(), 2.0);
    assert!(chart.line("first").is_none());
    assert!(chart.line("other").is_some());
}
