//! egui painting for the analytics containers and glance charts

use chrono::{Datelike, NaiveDate};

use super::{
    ticks, Chart, ChartId, ChartState, CountChart, GlanceCharts, NetworkLayout, RatingsChart, RuntimeChart,
    ViewingPatternsChart, LOADING_MESSAGE, NO_HISTORY_MESSAGE, RATING_MAX,
};

const CHART_HEIGHT: f32 = 260.0;
const NETWORK_HEIGHT: f32 = 400.0;
const MARGIN_LEFT: f32 = 44.0;
const MARGIN_RIGHT: f32 = 16.0;
const MARGIN_TOP: f32 = 12.0;
const MARGIN_BOTTOM: f32 = 36.0;

const BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(70, 130, 180);
const DIRECTOR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 127, 14);
const WRITER_COLOR: egui::Color32 = egui::Color32::from_rgb(31, 119, 180);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 80, 80);

const PALETTE: [egui::Color32; 10] = [
    egui::Color32::from_rgb(31, 119, 180),
    egui::Color32::from_rgb(255, 127, 14),
    egui::Color32::from_rgb(44, 160, 44),
    egui::Color32::from_rgb(214, 39, 40),
    egui::Color32::from_rgb(148, 103, 189),
    egui::Color32::from_rgb(140, 86, 75),
    egui::Color32::from_rgb(227, 119, 194),
    egui::Color32::from_rgb(127, 127, 127),
    egui::Color32::from_rgb(188, 189, 34),
    egui::Color32::from_rgb(23, 190, 207),
];

/// One chart container: title plus whatever its state calls for
pub fn show_chart_slot(ui: &mut egui::Ui, id: ChartId, state: &ChartState) {
    egui::Frame::group(ui.style()).inner_margin(egui::Margin::same(8)).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new(id.title()).strong().size(16.0));
        ui.add_space(4.0);

        match state {
            ChartState::Idle => {
                ui.label(egui::RichText::new("Open the Analytics tab or press Refresh").weak());
            }
            ChartState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(LOADING_MESSAGE);
                });
            }
            ChartState::NoHistory => {
                ui.label(egui::RichText::new(NO_HISTORY_MESSAGE).weak());
            }
            ChartState::NoData => {
                ui.label(egui::RichText::new(id.no_data_message()).weak());
            }
            ChartState::Failed(message) => {
                ui.label(egui::RichText::new(message).color(ERROR_COLOR));
            }
            ChartState::Ready(chart) => show_chart(ui, chart),
        }
    });
}

fn show_chart(ui: &mut egui::Ui, chart: &Chart) {
    match chart {
        Chart::Ratings(c) => draw_ratings(ui, c),
        Chart::Genres(c) => draw_genres(ui, c),
        Chart::ReleaseYears(c) => draw_release_years(ui, c),
        Chart::CreatorsNetwork(layout) => draw_network(ui, layout),
        Chart::ViewingPatterns(c) => draw_viewing_patterns(ui, c),
        Chart::RuntimeDistribution(c) => draw_runtime(ui, c),
    }
}

/// Plot area inside the allocated rect plus the shared y scale
struct PlotArea {
    plot: egui::Rect,
    y_max: f64,
}

impl PlotArea {
    fn y(&self, value: f64) -> f32 {
        let t = (value / self.y_max).clamp(0.0, 1.0) as f32;
        self.plot.bottom() - t * self.plot.height()
    }

    fn x(&self, t: f64) -> f32 {
        self.plot.left() + t.clamp(0.0, 1.0) as f32 * self.plot.width()
    }
}

fn axis_color(ui: &egui::Ui) -> egui::Color32 {
    ui.visuals().weak_text_color()
}

fn text_color(ui: &egui::Ui) -> egui::Color32 {
    ui.visuals().text_color()
}

fn small_font() -> egui::FontId {
    egui::FontId::proportional(11.0)
}

fn allocate_plot(ui: &mut egui::Ui, height: f32, y_max: f64) -> (egui::Response, egui::Painter, PlotArea) {
    let size = egui::vec2(ui.available_width().max(200.0), height);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    let plot = egui::Rect::from_min_max(
        egui::pos2(rect.left() + MARGIN_LEFT, rect.top() + MARGIN_TOP),
        egui::pos2(rect.right() - MARGIN_RIGHT, rect.bottom() - MARGIN_BOTTOM),
    );
    (response, painter, PlotArea { plot, y_max })
}

/// Left axis with gridlines and the bottom baseline
fn draw_y_axis(ui: &egui::Ui, painter: &egui::Painter, frame: &PlotArea, label: &str) {
    let stroke = egui::Stroke::new(1.0, axis_color(ui));
    let grid = egui::Stroke::new(0.5, axis_color(ui).gamma_multiply(0.3));

    for tick in ticks(frame.y_max, 5) {
        let y = frame.y(tick);
        painter.line_segment([egui::pos2(frame.plot.left(), y), egui::pos2(frame.plot.right(), y)], grid);
        painter.text(
            egui::pos2(frame.plot.left() - 4.0, y),
            egui::Align2::RIGHT_CENTER,
            format_tick(tick),
            small_font(),
            axis_color(ui),
        );
    }

    painter.line_segment([frame.plot.left_top(), frame.plot.left_bottom()], stroke);
    painter.line_segment([frame.plot.left_bottom(), frame.plot.right_bottom()], stroke);
    painter.text(
        egui::pos2(frame.plot.left() - 36.0, frame.plot.top() - 2.0),
        egui::Align2::LEFT_BOTTOM,
        label,
        small_font(),
        axis_color(ui),
    );
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn x_label(ui: &egui::Ui, painter: &egui::Painter, frame: &PlotArea, x: f32, text: &str) {
    painter.text(
        egui::pos2(x, frame.plot.bottom() + 4.0),
        egui::Align2::CENTER_TOP,
        text,
        small_font(),
        axis_color(ui),
    );
}

fn axis_title(ui: &egui::Ui, painter: &egui::Painter, frame: &PlotArea, text: &str) {
    painter.text(
        egui::pos2(frame.plot.center().x, frame.plot.bottom() + 20.0),
        egui::Align2::CENTER_TOP,
        text,
        small_font(),
        text_color(ui),
    );
}

fn hovered_index(response: &egui::Response, frame: &PlotArea, count: usize) -> Option<usize> {
    let pos = response.hover_pos()?;
    if count == 0 || !frame.plot.contains(pos) {
        return None;
    }
    let t = (pos.x - frame.plot.left()) / frame.plot.width();
    Some(((t * count as f32) as usize).min(count - 1))
}

fn draw_ratings(ui: &mut egui::Ui, chart: &RatingsChart) {
    let (response, painter, frame) = allocate_plot(ui, CHART_HEIGHT, chart.y_max);
    draw_y_axis(ui, &painter, &frame, "Number of Movies");

    for bin in &chart.bins {
        let x0 = frame.x(bin.x0 / RATING_MAX) + 1.0;
        let x1 = frame.x(bin.x1 / RATING_MAX) - 1.0;
        let rect = egui::Rect::from_min_max(egui::pos2(x0, frame.y(bin.count as f64)), egui::pos2(x1, frame.plot.bottom()));
        painter.rect_filled(rect, 0.0, BAR_COLOR);
    }
    for rating in 0..=RATING_MAX as i32 {
        x_label(ui, &painter, &frame, frame.x(rating as f64 / RATING_MAX), &rating.to_string());
    }
    axis_title(ui, &painter, &frame, "IMDb Rating");

    if let Some(i) = hovered_index(&response, &frame, chart.bins.len()) {
        let bin = &chart.bins[i];
        response.on_hover_text(format!("{:.1}–{:.1}: {} movies", bin.x0, bin.x1, bin.count));
    }
}

fn draw_genres(ui: &mut egui::Ui, chart: &CountChart<String>) {
    let (response, painter, frame) = allocate_plot(ui, CHART_HEIGHT, chart.y_max);
    draw_y_axis(ui, &painter, &frame, "Count");

    let n = chart.counts.len().max(1) as f64;
    let band = frame.plot.width() / n as f32;
    for (i, (genre, count)) in chart.counts.iter().enumerate() {
        let left = frame.x(i as f64 / n) + band * 0.1;
        let right = left + band * 0.8;
        let rect = egui::Rect::from_min_max(egui::pos2(left, frame.y(*count as f64)), egui::pos2(right, frame.plot.bottom()));
        painter.rect_filled(rect, 0.0, PALETTE[i % PALETTE.len()]);
        x_label(ui, &painter, &frame, rect.center().x, genre);
    }

    if let Some(i) = hovered_index(&response, &frame, chart.counts.len()) {
        let (genre, count) = &chart.counts[i];
        response.on_hover_text(format!("{}: {}", genre, count));
    }
}

fn draw_release_years(ui: &mut egui::Ui, chart: &CountChart<i32>) {
    let (response, painter, frame) = allocate_plot(ui, CHART_HEIGHT, chart.y_max);
    draw_y_axis(ui, &painter, &frame, "Movies");

    let (first, last) = match (chart.counts.first(), chart.counts.last()) {
        (Some(f), Some(l)) => (f.0, l.0),
        _ => return,
    };
    let span = (last - first).max(1) as f64;
    let x_of = |year: i32| {
        if first == last {
            frame.plot.center().x
        } else {
            frame.x((year - first) as f64 / span)
        }
    };

    let points: Vec<egui::Pos2> = chart.counts.iter().map(|(y, c)| egui::pos2(x_of(*y), frame.y(*c as f64))).collect();

    // Area under the line, one trapezoid per segment
    for pair in points.windows(2) {
        let quad = vec![
            pair[0],
            pair[1],
            egui::pos2(pair[1].x, frame.plot.bottom()),
            egui::pos2(pair[0].x, frame.plot.bottom()),
        ];
        painter.add(egui::Shape::convex_polygon(quad, BAR_COLOR.gamma_multiply(0.3), egui::Stroke::NONE));
    }
    painter.add(egui::Shape::line(points.clone(), egui::Stroke::new(2.0, BAR_COLOR)));
    for p in &points {
        painter.circle_filled(*p, 4.0, BAR_COLOR);
    }

    let step = tick_years(first, last);
    let mut year = first - first.rem_euclid(step);
    while year <= last {
        if year >= first {
            x_label(ui, &painter, &frame, x_of(year), &year.to_string());
        }
        year += step;
    }
    axis_title(ui, &painter, &frame, "Release Year");

    if let Some(pos) = response.hover_pos() {
        if let Some((i, _)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| (p.x - pos.x).abs() < 6.0 && (p.y - pos.y).abs() < 6.0)
        {
            let (year, count) = chart.counts[i];
            response.on_hover_text(format!("{}: {} movies", year, count));
        }
    }
}

fn tick_years(first: i32, last: i32) -> i32 {
    match last - first {
        0..=10 => 1,
        11..=25 => 5,
        26..=60 => 10,
        _ => 20,
    }
}

fn draw_network(ui: &mut egui::Ui, layout: &NetworkLayout) {
    let size = egui::vec2(ui.available_width().max(200.0), NETWORK_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect.shrink(10.0);

    // Fit the simulated extent into the container without distorting it
    let (x0, y0, x1, y1) = layout.bounds();
    let (w, h) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
    let scale = (rect.width() as f64 / w).min(rect.height() as f64 / h).min(1.5);
    let offset_x = rect.center().x as f64 - (x0 + w / 2.0) * scale;
    let offset_y = rect.center().y as f64 - (y0 + h / 2.0) * scale;
    let to_screen = |x: f64, y: f64| egui::pos2((x * scale + offset_x) as f32, (y * scale + offset_y) as f32);

    let link_color = egui::Color32::from_rgb(153, 153, 153).gamma_multiply(0.6);
    for link in &layout.links {
        let (s, t) = (&layout.nodes[link.source], &layout.nodes[link.target]);
        painter.line_segment([to_screen(s.x, s.y), to_screen(t.x, t.y)], egui::Stroke::new(link.width, link_color));
    }

    let mut hovered = None;
    for node in &layout.nodes {
        let center = to_screen(node.x, node.y);
        let color = if node.is_director { DIRECTOR_COLOR } else { WRITER_COLOR };
        painter.circle(center, node.radius, color, egui::Stroke::new(1.5, egui::Color32::WHITE));
        painter.text(
            center + egui::vec2(node.radius + 3.0, 0.0),
            egui::Align2::LEFT_CENTER,
            &node.name,
            small_font(),
            text_color(ui),
        );
        if let Some(pos) = response.hover_pos() {
            if pos.distance(center) <= node.radius + 2.0 {
                hovered = Some(node);
            }
        }
    }

    // Legend
    let legend = egui::pos2(response.rect.left() + 12.0, response.rect.top() + 12.0);
    for (i, (label, color)) in [("Director", DIRECTOR_COLOR), ("Writer", WRITER_COLOR)].iter().enumerate() {
        let y = legend.y + i as f32 * 18.0;
        painter.circle_filled(egui::pos2(legend.x, y), 6.0, *color);
        painter.text(egui::pos2(legend.x + 12.0, y), egui::Align2::LEFT_CENTER, label, small_font(), text_color(ui));
    }

    if let Some(node) = hovered {
        response.on_hover_text(format!("{} ({})\nMovies: {}", node.name, node.role, node.movies.join(", ")));
    }
}

fn draw_viewing_patterns(ui: &mut egui::Ui, chart: &ViewingPatternsChart) {
    let (response, painter, frame) = allocate_plot(ui, CHART_HEIGHT, chart.y_max);
    draw_y_axis(ui, &painter, &frame, "Movies Watched");

    let (first, last) = match (chart.points.first(), chart.points.last()) {
        (Some(f), Some(l)) => (f.0, l.0),
        _ => return,
    };
    let span = (last - first).num_days().max(1) as f64;
    let x_of = |date: NaiveDate| {
        if first == last {
            frame.plot.center().x
        } else {
            frame.x((date - first).num_days() as f64 / span)
        }
    };

    let points: Vec<egui::Pos2> = chart.points.iter().map(|(d, c)| egui::pos2(x_of(*d), frame.y(*c as f64))).collect();
    painter.add(egui::Shape::line(points.clone(), egui::Stroke::new(2.0, BAR_COLOR)));
    for p in &points {
        painter.circle_filled(*p, 4.0, BAR_COLOR);
    }

    for date in month_ticks(first, last) {
        x_label(ui, &painter, &frame, x_of(date), &date.format("%b %Y").to_string());
    }

    if let Some(pos) = response.hover_pos() {
        if let Some((i, _)) = points.iter().enumerate().find(|(_, p)| (p.x - pos.x).abs() < 6.0) {
            let (date, count) = chart.points[i];
            response.on_hover_text(format!("Week of {}: {} movies", date.format("%b %-d, %Y"), count));
        }
    }
}

/// First-of-month dates inside the extent, thinned to at most six labels
fn month_ticks(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let (mut year, mut month) = (first.year(), first.month());
    while let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
        if date > last {
            break;
        }
        if date >= first {
            months.push(date);
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    if months.is_empty() {
        return vec![first];
    }
    let stride = months.len().div_ceil(6);
    months.into_iter().step_by(stride.max(1)).collect()
}

fn draw_runtime(ui: &mut egui::Ui, chart: &RuntimeChart) {
    let (response, painter, frame) = allocate_plot(ui, CHART_HEIGHT + 40.0, chart.y_max);
    draw_y_axis(ui, &painter, &frame, "Runtime (minutes)");

    let n = chart.boxes.len().max(1) as f64;
    let band = frame.plot.width() / n as f32;
    let whisker = egui::Stroke::new(1.0, text_color(ui));

    for (i, b) in chart.boxes.iter().enumerate() {
        let center = frame.x((i as f64 + 0.5) / n);
        let half = band * 0.3;
        let color = PALETTE[i % PALETTE.len()];

        painter.line_segment([egui::pos2(center, frame.y(b.min)), egui::pos2(center, frame.y(b.max))], whisker);
        for value in [b.min, b.max] {
            painter.line_segment(
                [egui::pos2(center - half / 2.0, frame.y(value)), egui::pos2(center + half / 2.0, frame.y(value))],
                whisker,
            );
        }
        let body = egui::Rect::from_min_max(egui::pos2(center - half, frame.y(b.q3)), egui::pos2(center + half, frame.y(b.q1)));
        painter.rect_filled(body, 0.0, color.gamma_multiply(0.7));
        painter.line_segment(
            [egui::pos2(center - half, frame.y(b.median)), egui::pos2(center + half, frame.y(b.median))],
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
        painter.circle_filled(egui::pos2(center, frame.y(b.mean)), 3.0, egui::Color32::BLACK);
        x_label(ui, &painter, &frame, center, &b.genre);
    }

    if let Some(i) = hovered_index(&response, &frame, chart.boxes.len()) {
        let b = &chart.boxes[i];
        response.on_hover_text(format!(
            "{}\nMin: {:.0}\nQ1: {:.1}\nMedian: {:.1}\nQ3: {:.1}\nMax: {:.0}\nMean: {:.1}",
            b.genre, b.min, b.q1, b.median, b.q3, b.max, b.mean
        ));
    }
}

/// Rating bar, genre pie and release-year marker for the selected movie
pub fn show_glance_charts(ui: &mut egui::Ui, glance: &GlanceCharts) {
    ui.horizontal_top(|ui| {
        glance_rating(ui, glance.rating);
        ui.add_space(12.0);
        glance_genres(ui, &glance.genres);
        ui.add_space(12.0);
        glance_year(ui, glance.year);
    });
}

fn glance_rating(ui: &mut egui::Ui, rating: Option<f64>) {
    let (response, painter) = ui.allocate_painter(egui::vec2(90.0, 160.0), egui::Sense::hover());
    let rect = response.rect;
    let track = egui::Rect::from_min_max(egui::pos2(rect.center().x - 15.0, rect.top() + 10.0), egui::pos2(rect.center().x + 15.0, rect.bottom() - 24.0));
    painter.rect_filled(track, 2.0, ui.visuals().faint_bg_color);

    let label = match rating {
        Some(r) => {
            let height = track.height() * (r / RATING_MAX) as f32;
            let bar = egui::Rect::from_min_max(egui::pos2(track.left(), track.bottom() - height), track.right_bottom());
            painter.rect_filled(bar, 2.0, BAR_COLOR);
            format!("Rating: {}/10", r)
        }
        None => "Rating: N/A".to_string(),
    };
    painter.text(egui::pos2(rect.center().x, rect.bottom() - 4.0), egui::Align2::CENTER_BOTTOM, label, small_font(), text_color(ui));
}

fn glance_genres(ui: &mut egui::Ui, genres: &[String]) {
    let (response, painter) = ui.allocate_painter(egui::vec2(160.0, 160.0), egui::Sense::hover());
    let center = response.rect.center();
    let radius = 60.0;

    match genres.len() {
        0 => {
            painter.text(center, egui::Align2::CENTER_CENTER, "No genres", small_font(), axis_color(ui));
        }
        1 => {
            painter.circle_filled(center, radius, PALETTE[0]);
            painter.text(center, egui::Align2::CENTER_CENTER, &genres[0], small_font(), egui::Color32::WHITE);
        }
        n => {
            let slice = std::f32::consts::TAU / n as f32;
            for (i, genre) in genres.iter().enumerate() {
                let start = i as f32 * slice - std::f32::consts::FRAC_PI_2;
                let mut points = vec![center];
                let steps = 16;
                for s in 0..=steps {
                    let a = start + slice * s as f32 / steps as f32;
                    points.push(center + egui::vec2(a.cos(), a.sin()) * radius);
                }
                painter.add(egui::Shape::convex_polygon(points, PALETTE[i % PALETTE.len()], egui::Stroke::new(1.0, egui::Color32::WHITE)));

                let mid = start + slice / 2.0;
                painter.text(
                    center + egui::vec2(mid.cos(), mid.sin()) * radius * 0.6,
                    egui::Align2::CENTER_CENTER,
                    genre,
                    small_font(),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}

fn glance_year(ui: &mut egui::Ui, year: Option<i32>) {
    let (response, painter) = ui.allocate_painter(egui::vec2(220.0, 160.0), egui::Sense::hover());
    let rect = response.rect.shrink2(egui::vec2(16.0, 0.0));
    let y = rect.center().y;
    let stroke = egui::Stroke::new(1.5, axis_color(ui));
    painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);

    let Some(year) = year else {
        painter.text(egui::pos2(rect.center().x, y + 14.0), egui::Align2::CENTER_TOP, "Year unknown", small_font(), axis_color(ui));
        return;
    };

    // Decade window around the release year
    let start = year - year.rem_euclid(10) - 10;
    let end = start + 30;
    let x_of = |v: i32| rect.left() + (v - start) as f32 / (end - start) as f32 * rect.width();
    for tick in (start..=end).step_by(10) {
        let x = x_of(tick);
        painter.line_segment([egui::pos2(x, y - 4.0), egui::pos2(x, y + 4.0)], stroke);
        painter.text(egui::pos2(x, y + 8.0), egui::Align2::CENTER_TOP, tick.to_string(), small_font(), axis_color(ui));
    }
    let marker = egui::pos2(x_of(year), y);
    painter.circle_filled(marker, 7.0, DIRECTOR_COLOR);
    painter.text(marker - egui::vec2(0.0, 12.0), egui::Align2::CENTER_BOTTOM, year.to_string(), small_font(), text_color(ui));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_ticks_thinned() {
        let first = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let ticks = month_ticks(first, last);
        assert!(ticks.len() <= 6);
        assert_eq!(ticks[0], NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_month_ticks_short_extent() {
        let first = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        assert_eq!(month_ticks(first, last), vec![first]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(3.0), "3");
        assert_eq!(format_tick(0.5), "0.5");
    }

    #[test]
    fn test_tick_years() {
        assert_eq!(tick_years(1999, 1999), 1);
        assert_eq!(tick_years(1980, 2024), 10);
    }
}
