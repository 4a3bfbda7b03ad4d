//! Dựng các mảnh HTML của chart từ model đã chuẩn hóa.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveTime;
use timechart_core::{
    add_step, ceil_to_step, format_hm, minutes_between, round2, ChartOptions, GroupOrder,
    GroupedEntry, Line, TimelineChart,
};

/// Chặn trên số vạch sinh ra cho một lần vẽ thước.
pub const MAX_RULER_TICKS: usize = 10_000;

/// CSS mặc định của widget kèm các token dễ override.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --timechart-font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
  --timechart-text: #1f2933;
  --timechart-muted: #52606d;
  --timechart-bar-height: 18px;
  --timechart-unknown: #d0d5dd;
}

.time-line-chart {
  font-family: var(--timechart-font-family);
  color: var(--timechart-text);
}

.time-bar {
  position: relative;
  height: 1.5em;
  overflow: hidden;
}

.time-bar-item {
  font-size: 12px;
  color: var(--timechart-muted);
  white-space: nowrap;
}

.legend-bar span {
  display: inline-block;
  margin-right: 12px;
  font-size: 12px;
}

.line-bar,
.line-grouped-by-legend,
.line-common-grouped-by-legend {
  white-space: nowrap;
  font-size: 0;
  margin-top: 4px;
}

.timeline-item {
  height: var(--timechart-bar-height);
}

.timeline-item-unknown {
  background: var(--timechart-unknown);
}
"#;

/// Thanh chú giải: một span cho mỗi legend.
pub fn render_legend_bar(chart: &TimelineChart) -> String {
    let mut html = String::new();
    for legend in chart.legends() {
        let _ = write!(
            html,
            r#"<span class="{}" title="{}">{}</span>"#,
            legend.style_class, legend.name, legend.name
        );
    }
    html
}

/// Thước thời gian: các vạch đặt theo vị trí tuyệt đối, offset trái
/// cộng dồn cục bộ trong một lần vẽ.
pub fn render_time_bar(chart: &TimelineChart, step: u32) -> String {
    let start_time = chart.start_time();
    let end_time = chart.end_time();

    let mut html = String::new();
    let mut position_left = 0.0;
    let mut next_step_time = ceil_to_step(start_time, step);

    // Vạch đầu khi mốc bắt đầu lệch khỏi bội số của step.
    if start_time < next_step_time {
        push_time_bar_step(
            &mut html,
            chart,
            start_time,
            minutes_between(start_time, next_step_time),
            &mut position_left,
            None,
        );
    }

    let mut last_step_time = None;
    let mut ticks = 0;
    while end_time > next_step_time && ticks < MAX_RULER_TICKS {
        push_time_bar_step(
            &mut html,
            chart,
            next_step_time,
            i64::from(step),
            &mut position_left,
            None,
        );
        last_step_time = Some(next_step_time);
        next_step_time = add_step(next_step_time, step);
        ticks += 1;
    }

    // Vạch cuối ghim vào mép phải thay vì theo offset cộng dồn.
    if let Some(last_step_time) = last_step_time {
        if end_time > last_step_time {
            push_time_bar_step(
                &mut html,
                chart,
                end_time,
                minutes_between(end_time, last_step_time),
                &mut position_left,
                Some(f64::from(chart.width())),
            );
        }
    }

    html
}

fn push_time_bar_step(
    html: &mut String,
    chart: &TimelineChart,
    time: NaiveTime,
    count_minutes: i64,
    position_left: &mut f64,
    fixed_left: Option<f64>,
) {
    let label = format_hm(time);
    let step_width = round2(count_minutes as f64 * chart.minute_width());
    let left = fixed_left.unwrap_or(*position_left);

    let _ = write!(
        html,
        "<span class=\"time-bar-item\" style=\"position: absolute; width: 100%; margin-left: -50%; text-align: center; left: {left}px;\" title=\"{label}\">{label}</span>"
    );

    *position_left += step_width;
}

/// Một hàng chart: mỗi đoạn một span với bề rộng theo số phút.
pub fn render_line(chart: &TimelineChart, line: &Line) -> String {
    let mut html = String::new();
    for segment in &line.segments {
        let width = round2(segment.minutes() as f64 * chart.minute_width());
        let _ = write!(
            html,
            "<span data-timeline-legend=\"{legend}\" data-timeline-start-time=\"{start}\" data-timeline-end-time=\"{end}\" class=\"timeline-item timeline-item-{legend}\" style=\"width: {width}px; display: inline-block;\"></span>",
            legend = segment.legend,
            start = format_hm(segment.start),
            end = format_hm(segment.end),
        );
    }
    html
}

/// Hàng gộp theo legend của một line.
pub fn render_grouped_line(
    chart: &TimelineChart,
    line: &Line,
    order: Option<GroupOrder>,
    weights: Option<&HashMap<String, i64>>,
) -> String {
    render_grouped_entries(
        &chart.group_by_legend(line, order, weights),
        chart.minute_width(),
    )
}

/// Hàng tổng hợp của mọi line, tỉ lệ chia đều theo số line.
pub fn render_aggregate_line(chart: &TimelineChart, order: Option<GroupOrder>) -> String {
    let minute_width = chart.minute_width() / chart.count_lines() as f64;
    render_grouped_entries(&chart.aggregate_across_lines(order), minute_width)
}

fn render_grouped_entries(entries: &[GroupedEntry], minute_width: f64) -> String {
    let mut html = String::new();
    for entry in entries {
        let width = round2(entry.total_minutes as f64 * minute_width);
        let _ = write!(
            html,
            "<span data-timeline-legend=\"{legend}\" data-timeline-total-minutes=\"{minutes}\" class=\"timeline-item timeline-item-{legend}\" style=\"width: {width}px; display: inline-block;\"></span>",
            legend = entry.legend,
            minutes = entry.total_minutes,
        );
    }
    html
}

/// Ghép trọn widget: thước, chú giải, từng line và hàng tổng hợp.
pub fn render_chart(chart: &TimelineChart, options: &ChartOptions) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<div class=\"time-line-chart\">");
    let _ = writeln!(
        html,
        "<div class=\"time-bar\">{}</div>",
        render_time_bar(chart, options.step)
    );
    let _ = writeln!(
        html,
        "<div class=\"legend-bar\">{}</div>",
        render_legend_bar(chart)
    );
    for line in chart.lines() {
        let _ = writeln!(
            html,
            "<div class=\"line-bar\" data-timeline=\"{}\">{}</div>",
            line.name,
            render_line(chart, line)
        );
    }
    let _ = writeln!(
        html,
        "<div class=\"line-common-grouped-by-legend\">{}</div>",
        render_aggregate_line(chart, None)
    );
    let _ = writeln!(html, "</div>");
    html
}
