use super::pages::{ChartKind, MarkerShape, PageSpec, Series, XAxis, HOURS_PER_DAY};
use super::PageRenderer;
use maud::{html, PreEscaped};
use plotly::common::{Line, Marker, MarkerSymbol, Mode, TickMode, Title};
use plotly::layout::{Axis, AxisType, Layout};
use plotly::{Bar, Plot, Scatter};

const PLOT_WIDTH: usize = 1100;
const PLOT_HEIGHT: usize = 560;

/// Draws each page as a `<section>` holding a plotly chart.
#[derive(Debug, Clone, Default)]
pub struct HtmlPageRenderer;

impl PageRenderer for HtmlPageRenderer {
    fn render_page(&self, page: &PageSpec) -> Result<String, String> {
        page.validate()?;

        let div_id = format!("page-{}-chart", page.number);
        let plot = build_plot(page);

        Ok(html! {
            section class="page" id=(format!("page-{}", page.number)) {
                h2 { (page.title) }
                (PreEscaped(plot.to_inline_html(Some(div_id.as_str()))))
            }
        }
        .into_string())
    }
}

fn build_plot(page: &PageSpec) -> Plot {
    let mut plot = Plot::new();

    match &page.x_axis {
        XAxis::Categories(labels) => {
            for series in &page.series {
                add_series(&mut plot, page.chart, labels.clone(), series);
            }
        }
        XAxis::HourOfDay => {
            let hours: Vec<u32> = (0..HOURS_PER_DAY).collect();
            for series in &page.series {
                add_series(&mut plot, page.chart, hours.clone(), series);
            }
        }
    }

    let x_axis = match &page.x_axis {
        XAxis::Categories(_) => Axis::new()
            .title(Title::with_text(page.x_label.as_str()))
            .type_(AxisType::Category)
            .tick_angle(45.0),
        XAxis::HourOfDay => Axis::new()
            .title(Title::with_text(page.x_label.as_str()))
            .tick_mode(TickMode::Array)
            .tick_values((0..HOURS_PER_DAY).map(f64::from).collect())
            .range(vec![-0.5, f64::from(HOURS_PER_DAY) - 0.5]),
    };

    plot.set_layout(
        Layout::new()
            .title(Title::with_text(page.title.as_str()))
            .x_axis(x_axis)
            .y_axis(Axis::new().title(Title::with_text(page.y_label.as_str())))
            .show_legend(page.show_legend)
            .width(PLOT_WIDTH)
            .height(PLOT_HEIGHT),
    );
    plot
}

fn add_series<X>(plot: &mut Plot, chart: ChartKind, x: Vec<X>, series: &Series)
where
    X: serde::Serialize + Clone + 'static,
{
    let y = series.values.clone();
    let mut marker = Marker::new().color(series.color);
    if let Some(shape) = series.marker {
        marker = marker.symbol(symbol(shape));
    }

    match chart {
        ChartKind::Bar => plot.add_trace(Bar::new(x, y).name(&series.label).marker(marker)),
        ChartKind::Line => {
            let mode = if series.marker.is_some() {
                Mode::LinesMarkers
            } else {
                Mode::Lines
            };
            plot.add_trace(
                Scatter::new(x, y)
                    .name(&series.label)
                    .mode(mode)
                    .marker(marker)
                    .line(Line::new().color(series.color)),
            )
        }
    }
}

fn symbol(shape: MarkerShape) -> MarkerSymbol {
    match shape {
        MarkerShape::Circle => MarkerSymbol::Circle,
        MarkerShape::TriangleUp => MarkerSymbol::TriangleUp,
        MarkerShape::TriangleDown => MarkerSymbol::TriangleDown,
    }
}
