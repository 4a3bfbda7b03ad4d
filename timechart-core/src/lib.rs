//! Logic lõi của chart dải thời gian: phân tích mốc "HH:MM", chuẩn hóa
//! các line thành chuỗi đoạn liền mạch và tính tỉ lệ pixel cho mỗi phút.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Legend gán cho các đoạn trống được tự chèn khi chuẩn hóa.
pub const UNKNOWN_LEGEND: &str = "unknown";

/// Cấu hình hiển thị của chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartOptions {
    /// Số phút giữa hai vạch trên thước thời gian.
    pub step: u32,
    /// Bề rộng hiển thị tính theo pixel.
    pub width: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            step: 30,
            width: 800,
        }
    }
}

/// Đọc chuỗi "HH:MM" thành mốc phút trong ngày.
pub fn parse_time(value: &str) -> Result<NaiveTime, ChartError> {
    let (hour, minute) = value
        .split_once(':')
        .ok_or_else(|| ChartError::Parse(format!("expected HH:MM, received {value:?}")))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| ChartError::Parse(format!("invalid hour in {value:?}")))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| ChartError::Parse(format!("invalid minute in {value:?}")))?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ChartError::Parse(format!("hour or minute out of range in {value:?}")))
}

/// Số phút giữa hai mốc, không phụ thuộc thứ tự đối số.
pub fn minutes_between(a: NaiveTime, b: NaiveTime) -> i64 {
    (b - a).num_minutes().abs()
}

/// Đẩy phút lên bội số gần nhất của `step`; mốc đã chia hết giữ nguyên.
pub fn ceil_to_step(time: NaiveTime, step: u32) -> NaiveTime {
    if step == 0 {
        return time;
    }
    let minute = time.minute();
    let rounded = (minute + step - 1) / step * step;
    time + chrono::Duration::minutes(i64::from(rounded - minute))
}

/// Dịch mốc thời gian thêm `step` phút.
pub fn add_step(time: NaiveTime, step: u32) -> NaiveTime {
    time + chrono::Duration::minutes(i64::from(step))
}

/// Định dạng mốc thời gian thành "HH:MM" có số 0 dẫn đầu.
pub fn format_hm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Làm tròn về 2 chữ số thập phân, dùng chung cho tỉ lệ và bề rộng pixel.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Lỗi khi dựng model chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Chuỗi thời gian không đúng dạng "HH:MM".
    #[error("could not parse time: {0}")]
    Parse(String),
    /// Đoạn có mốc kết thúc sớm hơn mốc bắt đầu.
    #[error("end time must be more than start time (legend {legend} in line {line})")]
    InvertedSegment { line: String, legend: String },
    /// Các đoạn trong một line không theo trình tự thời gian.
    #[error("the segments must be sequential (legend {legend} in line {line})")]
    NonSequential { line: String, legend: String },
    /// Dataset không chứa đoạn nào.
    #[error("the dataset contains no segments")]
    EmptyDataset,
    /// Khoảng hiển thị dài 0 phút nên không chia được bề rộng.
    #[error("cannot derive a pixel scale from a zero-length span")]
    DivisionByZero,
}

/// Mô tả một legend: mã, tên hiển thị và class CSS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Legend {
    pub id: String,
    pub name: String,
    #[serde(rename = "class")]
    pub style_class: String,
}

/// Một đoạn thời gian liền mạch gắn với một legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub legend: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Segment {
    /// Đoạn trống chèn vào khoảng hở giữa dữ liệu thật.
    pub fn unknown(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            legend: UNKNOWN_LEGEND.to_string(),
            start,
            end,
        }
    }

    /// Độ dài đoạn tính theo phút.
    pub fn minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }
}

/// Một hàng của chart sau khi chuẩn hóa.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Line {
    pub name: String,
    pub segments: Vec<Segment>,
}

/// Bộ ba thô (legend, start, end) với thời gian còn ở dạng chuỗi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSlice {
    pub legend: String,
    pub start: String,
    pub end: String,
}

/// Một hàng dữ liệu thô theo thứ tự caller đưa vào.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawLine {
    pub name: String,
    pub slices: Vec<RawSlice>,
}

/// Dataset thô đưa vào model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartData {
    pub legends: Vec<Legend>,
    pub lines: Vec<RawLine>,
}

/// Một nhóm legend kèm tổng số phút sau khi gộp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupedEntry {
    pub legend: String,
    pub total_minutes: i64,
}

/// Hướng sắp xếp khi gộp theo legend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupOrder {
    Asc,
    Desc,
    Legend,
}

/// Model trung tâm: giữ các line đã chuẩn hóa, khoảng hiển thị chung
/// và tỉ lệ pixel suy ra từ bề rộng.
#[derive(Debug, Clone)]
pub struct TimelineChart {
    legends: Vec<Legend>,
    lines: Vec<Line>,
    start_time: NaiveTime,
    end_time: NaiveTime,
    all_minutes: i64,
    width: u32,
    minute_width: f64,
}

impl TimelineChart {
    /// Khởi tạo model từ dataset thô và cấu hình hiển thị.
    pub fn new(data: ChartData, options: &ChartOptions) -> Result<Self, ChartError> {
        let mut chart = Self {
            legends: Vec::new(),
            lines: Vec::new(),
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            all_minutes: 0,
            width: 0,
            minute_width: 0.0,
        };
        chart.set_data(data)?;
        chart.set_width(options.width)?;
        Ok(chart)
    }

    /// Thay dataset và chuẩn hóa lại toàn bộ các line.
    ///
    /// Không đụng tới tỉ lệ pixel; caller gọi lại [`TimelineChart::set_width`]
    /// sau khi đổi dữ liệu. Khi trả về lỗi thì model không còn đáng tin.
    pub fn set_data(&mut self, data: ChartData) -> Result<(), ChartError> {
        let parsed = parse_lines(&data.lines)?;
        let (start_time, end_time) = span_of(&parsed).ok_or(ChartError::EmptyDataset)?;

        let mut lines = Vec::with_capacity(parsed.len());
        for (name, segments) in parsed {
            lines.push(normalize_line(name, segments, start_time, end_time)?);
        }

        self.legends = data.legends;
        self.lines = lines;
        self.start_time = start_time;
        self.end_time = end_time;
        self.all_minutes = minutes_between(start_time, end_time);
        Ok(())
    }

    /// Đặt bề rộng hiển thị và tính lại tỉ lệ pixel cho mỗi phút.
    pub fn set_width(&mut self, width: u32) -> Result<(), ChartError> {
        if self.all_minutes == 0 {
            return Err(ChartError::DivisionByZero);
        }
        self.width = width;
        self.minute_width = round2(f64::from(width) / self.all_minutes as f64);
        Ok(())
    }

    /// Gộp các đoạn của một line theo legend và cộng dồn số phút.
    ///
    /// Không có `order` thì giữ thứ tự xuất hiện đầu tiên của từng legend.
    pub fn group_by_legend(
        &self,
        line: &Line,
        order: Option<GroupOrder>,
        weights: Option<&HashMap<String, i64>>,
    ) -> Vec<GroupedEntry> {
        let mut grouped: Vec<GroupedEntry> = Vec::new();
        for segment in &line.segments {
            let minutes = segment.minutes();
            match grouped
                .iter_mut()
                .find(|entry| entry.legend == segment.legend)
            {
                Some(entry) => entry.total_minutes += minutes,
                None => grouped.push(GroupedEntry {
                    legend: segment.legend.clone(),
                    total_minutes: minutes,
                }),
            }
        }

        match order {
            Some(GroupOrder::Desc) => {
                grouped.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
            }
            Some(GroupOrder::Asc) => {
                grouped.sort_by(|a, b| a.total_minutes.cmp(&b.total_minutes));
            }
            Some(GroupOrder::Legend) => {
                grouped.sort_by(|a, b| compare_by_weight(a, b, weights));
            }
            None => {}
        }

        grouped
    }

    /// Tổng hợp số phút theo legend trên toàn bộ các line.
    pub fn aggregate_across_lines(&self, order: Option<GroupOrder>) -> Vec<GroupedEntry> {
        let mut common: Vec<GroupedEntry> = Vec::new();
        for line in &self.lines {
            for entry in self.group_by_legend(line, order, None) {
                match common
                    .iter_mut()
                    .find(|existing| existing.legend == entry.legend)
                {
                    Some(existing) => existing.total_minutes += entry.total_minutes,
                    None => common.push(entry),
                }
            }
        }
        common
    }

    /// Danh sách legend do caller cung cấp, giữ nguyên không kiểm tra.
    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    /// Các line đã chuẩn hóa theo thứ tự dữ liệu vào.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Tìm một line theo tên.
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.name == name)
    }

    /// Mốc bắt đầu chung của mọi line.
    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    /// Mốc kết thúc chung của mọi line.
    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    /// Tổng số phút của khoảng hiển thị.
    pub fn all_minutes(&self) -> i64 {
        self.all_minutes
    }

    /// Số line trong chart.
    pub fn count_lines(&self) -> usize {
        self.lines.len()
    }

    /// Bề rộng hiển thị hiện tại theo pixel.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Số pixel cho mỗi phút, đã làm tròn 2 chữ số thập phân.
    pub fn minute_width(&self) -> f64 {
        self.minute_width
    }
}

fn parse_lines(raw: &[RawLine]) -> Result<Vec<(String, Vec<Segment>)>, ChartError> {
    let mut parsed = Vec::with_capacity(raw.len());
    for line in raw {
        let mut segments = Vec::with_capacity(line.slices.len());
        for slice in &line.slices {
            segments.push(Segment {
                legend: slice.legend.clone(),
                start: parse_time(&slice.start)?,
                end: parse_time(&slice.end)?,
            });
        }
        parsed.push((line.name.clone(), segments));
    }
    Ok(parsed)
}

fn span_of(lines: &[(String, Vec<Segment>)]) -> Option<(NaiveTime, NaiveTime)> {
    let mut span: Option<(NaiveTime, NaiveTime)> = None;
    for (_, segments) in lines {
        for segment in segments {
            span = Some(match span {
                None => (segment.start, segment.end),
                Some((start, end)) => (start.min(segment.start), end.max(segment.end)),
            });
        }
    }
    span
}

fn normalize_line(
    name: String,
    segments: Vec<Segment>,
    span_start: NaiveTime,
    span_end: NaiveTime,
) -> Result<Line, ChartError> {
    let mut normalized = Vec::with_capacity(segments.len());
    let mut prev_end: Option<NaiveTime> = None;

    for segment in segments {
        match prev_end {
            None => {
                if segment.start > span_start {
                    normalized.push(Segment::unknown(span_start, segment.start));
                }
            }
            Some(prev) if prev != segment.start => {
                if prev > segment.start {
                    return Err(ChartError::NonSequential {
                        line: name,
                        legend: segment.legend,
                    });
                }
                normalized.push(Segment::unknown(prev, segment.start));
            }
            Some(_) => {}
        }

        if segment.start > segment.end {
            return Err(ChartError::InvertedSegment {
                line: name,
                legend: segment.legend,
            });
        }

        prev_end = Some(segment.end);
        normalized.push(segment);
    }

    // Line rỗng: không có đoạn cuối nên cũng không chèn phần đuôi.
    if let Some(last_end) = prev_end {
        if last_end < span_end {
            normalized.push(Segment::unknown(last_end, span_end));
        }
    }

    Ok(Line {
        name,
        segments: normalized,
    })
}

// Thứ tự "legend": thiếu trọng số luôn xếp sau; trọng số cao đứng trước;
// hai trọng số bằng nhau rơi vào nhánh "b trước a" như comparator gốc.
fn compare_by_weight(
    a: &GroupedEntry,
    b: &GroupedEntry,
    weights: Option<&HashMap<String, i64>>,
) -> Ordering {
    let weight_a = weights.and_then(|map| map.get(&a.legend));
    let weight_b = weights.and_then(|map| map.get(&b.legend));

    match (weight_a, weight_b) {
        (None, _) => Ordering::Greater,
        (_, None) => Ordering::Less,
        (Some(wa), Some(wb)) if wa > wb => Ordering::Less,
        _ => Ordering::Greater,
    }
}
