//! Bridge WASM <-> JavaScript trung lập framework cho chart dải thời gian.

use serde::Deserialize;
use serde_wasm_bindgen::from_value;
use timechart_core::{ChartError, ChartOptions, TimelineChart};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod styles;

#[derive(Deserialize)]
struct JsChartOptions {
    #[serde(default)]
    step: Option<u32>,
    #[serde(default)]
    width: Option<u32>,
}

impl From<JsChartOptions> for ChartOptions {
    fn from(options: JsChartOptions) -> Self {
        let mut base = ChartOptions::default();
        if let Some(step) = options.step {
            base.step = step;
        }
        if let Some(width) = options.width {
            base.width = width;
        }
        base
    }
}

/// Dựng HTML của widget từ dataset JSON, không đụng tới DOM.
#[wasm_bindgen]
pub fn render_chart_html(dataset: JsValue, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let dataset_value = from_value::<serde_json::Value>(dataset)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON dataset: {err}")))?;
    let options = parse_options(options)?;

    build_chart_html(&dataset_value, &options).map(|html| JsValue::from_str(&html))
}

fn parse_options(options: Option<JsValue>) -> Result<ChartOptions, JsValue> {
    match options {
        Some(js_options) => {
            let options: JsChartOptions = from_value(js_options)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được options: {err}")))?;
            Ok(ChartOptions::from(options))
        }
        None => Ok(ChartOptions::default()),
    }
}

fn build_chart_html(
    dataset: &serde_json::Value,
    options: &ChartOptions,
) -> Result<String, JsValue> {
    let data = timechart_data::parse_dataset_value(dataset)
        .map_err(|err| JsValue::from_str(&format_chart_error(err)))?;
    let chart = TimelineChart::new(data, options)
        .map_err(|err| JsValue::from_str(&format_chart_error(err)))?;

    Ok(timechart_render::render_chart(&chart, options))
}

fn format_chart_error(err: ChartError) -> String {
    format!("Chart error: {err}")
}

#[cfg(target_arch = "wasm32")]
mod wasm_mount {
    use crate::styles;
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Window};

    /// Gắn widget vào element tìm theo selector, bơm CSS mặc định một lần.
    #[wasm_bindgen]
    pub fn mount_chart(
        selector: &str,
        dataset: JsValue,
        options: Option<JsValue>,
    ) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        styles::ensure_styles(&document)?;

        let dataset_value = from_value::<serde_json::Value>(dataset)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON dataset: {err}")))?;
        let options = crate::parse_options(options)?;

        let html = crate::build_chart_html(&dataset_value, &options)?;
        target.set_inner_html(&html);

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_mount::mount_chart;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_chart(_: &str, _: JsValue, _: Option<JsValue>) -> Result<(), JsValue> {
    Err(JsValue::from_str(
        "timechart-wasm chỉ gắn được DOM khi biên dịch target wasm32",
    ))
}
