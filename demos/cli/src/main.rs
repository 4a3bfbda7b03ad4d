use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use timechart_core::{ChartOptions, GroupOrder};
use timechart_data::chart_from_str;
use timechart_render::{render_chart, render_grouped_line, DEFAULT_STYLES};

#[derive(Parser, Debug)]
#[command(
    name = "timechart-cli",
    about = "Dựng trang HTML chart dải thời gian từ dataset JSON."
)]
struct Args {
    /// Đường dẫn tới file JSON dataset.
    #[arg(short, long)]
    input: PathBuf,

    /// Bề rộng hiển thị theo pixel.
    #[arg(long)]
    width: Option<u32>,

    /// Số phút giữa hai vạch trên thước thời gian.
    #[arg(long)]
    step: Option<u32>,

    /// Vẽ thêm hàng gộp theo legend cho từng line (asc|desc).
    #[arg(long)]
    order: Option<String>,

    /// Ghi trang HTML ra file thay vì stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dataset = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let mut options = ChartOptions::default();
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(step) = args.step {
        options.step = step;
    }

    let order = match args.order.as_deref() {
        None => None,
        Some("asc") => Some(GroupOrder::Asc),
        Some("desc") => Some(GroupOrder::Desc),
        Some(other) => anyhow::bail!("Giá trị order không hợp lệ: {other} (chỉ nhận asc|desc)"),
    };

    let chart = chart_from_str(&dataset, &options)?;

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>");
    page.push_str(DEFAULT_STYLES);
    page.push_str("</style>\n</head>\n<body>\n");
    page.push_str(&render_chart(&chart, &options));
    if let Some(order) = order {
        for line in chart.lines() {
            page.push_str(&format!(
                "<div class=\"line-grouped-by-legend\" data-timeline=\"{}\">{}</div>\n",
                line.name,
                render_grouped_line(&chart, line, Some(order), None)
            ));
        }
    }
    page.push_str("</body>\n</html>\n");

    match &args.output {
        Some(path) => {
            std::fs::write(path, page).with_context(|| format!("Không ghi được file {path:?}"))?
        }
        None => print!("{page}"),
    }

    Ok(())
}
