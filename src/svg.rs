//! SVG report renderer.
//!
//! Turns a [`RenderPlan`](crate::report::RenderPlan) into a standalone SVG
//! document: one stacked viewport per panel, with the plan's data-space
//! coordinates mapped onto pixels. All content decisions (colors, label
//! text, stacking order) were made by the composer; this module only does
//! geometry and markup.

use crate::report::{AxisTick, LegendEntry, Panel, Primitive, RenderPlan, TextAnchor};

const BACKGROUND_COLOR: &str = "#FFFFFF";
const TEXT_COLOR: &str = "#2C3E50";
const MUTED_TEXT_COLOR: &str = "#777777";
const FRAME_COLOR: &str = "#999999";

/// SVG renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Width of each panel's plot area in pixels
    pub chart_width: u32,
    /// Height per data row in pixels
    pub row_height: u32,
    /// Width of the label column left of the plot area
    pub label_width: u32,
    /// Height of each panel's title strip
    pub title_height: u32,
    /// Outer and inter-panel padding
    pub padding: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            chart_width: 860,
            row_height: 32,
            label_width: 220,
            title_height: 36,
            padding: 20,
        }
    }
}

/// Pixel-space mapping for one panel's plot area.
struct Viewport {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Viewport {
    fn x(&self, x: f64) -> f64 {
        let (x0, x1) = self.x_range;
        let span = (x1 - x0).max(1e-9);
        self.left + (x - x0) / span * self.width
    }

    /// Data y grows upward, pixel y grows downward.
    fn y(&self, y: f64) -> f64 {
        let (y0, y1) = self.y_range;
        let span = (y1 - y0).max(1e-9);
        self.top + self.height - (y - y0) / span * self.height
    }

    fn x_scale(&self, w: f64) -> f64 {
        let (x0, x1) = self.x_range;
        w / (x1 - x0).max(1e-9) * self.width
    }

    fn y_scale(&self, h: f64) -> f64 {
        let (y0, y1) = self.y_range;
        h / (y1 - y0).max(1e-9) * self.height
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure plot area width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure row height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Render a complete SVG document.
    pub fn render(&self, plan: &RenderPlan) -> String {
        let width = (self.padding * 2 + self.label_width + self.chart_width) as f64;
        let header_height = self.header_height(plan);

        let mut panel_tops = Vec::with_capacity(plan.panels.len());
        let mut cursor = self.padding as f64 + header_height;
        for panel in &plan.panels {
            panel_tops.push(cursor);
            cursor += self.panel_block_height(panel) + self.padding as f64;
        }
        let height = cursor;

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="Helvetica, Arial, sans-serif">"#
        ));
        svg.push('\n');
        svg.push_str(&self.render_defs(plan));
        svg.push_str(&format!(
            r#"  <rect x="0" y="0" width="{width}" height="{height}" fill="{BACKGROUND_COLOR}"/>"#
        ));
        svg.push('\n');
        svg.push_str(&self.render_document_header(plan, width));

        for (panel, top) in plan.panels.iter().zip(panel_tops) {
            svg.push_str(&self.render_panel(panel, top));
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn header_height(&self, plan: &RenderPlan) -> f64 {
        match (&plan.title, &plan.subtitle) {
            (None, _) => 0.0,
            (Some(_), None) => 38.0,
            (Some(_), Some(_)) => 58.0,
        }
    }

    /// One arrowhead marker per arrow color used by the plan.
    fn render_defs(&self, plan: &RenderPlan) -> String {
        let mut colors: Vec<&str> = Vec::new();
        for panel in &plan.panels {
            for primitive in &panel.primitives {
                if let Primitive::Arrow { color, .. } = primitive {
                    if !colors.contains(&color.as_str()) {
                        colors.push(color);
                    }
                }
            }
        }
        if colors.is_empty() {
            return String::new();
        }

        let mut svg = String::from("  <defs>\n");
        for color in colors {
            svg.push_str(&format!(
                r#"    <marker id="arrowhead-{id}" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto"><polygon points="0 0, 10 3.5, 0 7" fill="{color}"/></marker>"#,
                id = marker_id(color),
            ));
            svg.push('\n');
        }
        svg.push_str("  </defs>\n");
        svg
    }

    fn render_document_header(&self, plan: &RenderPlan, width: f64) -> String {
        let mut svg = String::new();
        let center = width / 2.0;
        if let Some(title) = &plan.title {
            svg.push_str(&format!(
                r#"  <text x="{center}" y="{y}" font-size="18" font-weight="bold" fill="{TEXT_COLOR}" text-anchor="middle">{title}</text>"#,
                y = self.padding as f64 + 12.0,
                title = xml_escape(title),
            ));
            svg.push('\n');
        }
        if let (Some(_), Some(subtitle)) = (&plan.title, &plan.subtitle) {
            svg.push_str(&format!(
                r#"  <text x="{center}" y="{y}" font-size="13" font-style="italic" fill="{MUTED_TEXT_COLOR}" text-anchor="middle">{subtitle}</text>"#,
                y = self.padding as f64 + 32.0,
                subtitle = xml_escape(subtitle),
            ));
            svg.push('\n');
        }
        svg
    }

    fn plot_height(&self, panel: &Panel) -> f64 {
        if panel.primitives.iter().any(|p| matches!(p, Primitive::Wedge { .. })) {
            return 300.0;
        }
        if panel.primitives.iter().any(|p| matches!(p, Primitive::Node { .. })) {
            return 320.0;
        }
        match panel.y_range {
            Some((y0, y1)) => {
                let rows = (y1 - y0).round().max(1.0);
                (rows * self.row_height as f64).max(3.0 * self.row_height as f64)
            }
            None => 140.0,
        }
    }

    fn bottom_margin(&self, panel: &Panel) -> f64 {
        if !panel.x_ticks.is_empty() {
            // Room for rotated tick labels plus the axis label
            96.0
        } else if panel.x_label.is_some() {
            44.0
        } else {
            16.0
        }
    }

    fn panel_block_height(&self, panel: &Panel) -> f64 {
        self.title_height as f64 + self.plot_height(panel) + self.bottom_margin(panel)
    }

    fn viewport(&self, panel: &Panel, top: f64) -> Viewport {
        Viewport {
            left: (self.padding + self.label_width) as f64,
            top: top + self.title_height as f64,
            width: self.chart_width as f64,
            height: self.plot_height(panel),
            x_range: panel.x_range.unwrap_or((0.0, 1.0)),
            y_range: panel.y_range.unwrap_or((0.0, 1.0)),
        }
    }

    fn render_panel(&self, panel: &Panel, top: f64) -> String {
        let vp = self.viewport(panel, top);
        let mut svg = String::new();

        svg.push_str(&format!(
            r#"  <text x="{x}" y="{y}" font-size="14" font-weight="bold" fill="{TEXT_COLOR}">{title}</text>"#,
            x = vp.left,
            y = top + 22.0,
            title = xml_escape(&panel.title),
        ));
        svg.push('\n');

        if panel.show_axes {
            svg.push_str(&self.render_axes(panel, &vp));
        }

        for primitive in &panel.primitives {
            svg.push_str(&self.render_primitive(primitive, &vp));
        }

        if !panel.legend.is_empty() {
            svg.push_str(&self.render_legend(&panel.legend, &vp));
        }

        svg
    }

    fn render_axes(&self, panel: &Panel, vp: &Viewport) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"  <rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="{FRAME_COLOR}" stroke-width="1"/>"#,
            x = px(vp.left),
            y = px(vp.top),
            w = px(vp.width),
            h = px(vp.height),
        ));
        svg.push('\n');

        for tick in &panel.y_ticks {
            let y = vp.y(tick.position);
            svg.push_str(&format!(
                r#"  <text x="{x}" y="{y}" font-size="11" fill="{TEXT_COLOR}" text-anchor="end" dominant-baseline="middle">{label}</text>"#,
                x = px(vp.left - 8.0),
                y = px(y),
                label = xml_escape(&tick.label),
            ));
            svg.push('\n');
        }

        let bottom = vp.top + vp.height;
        if panel.x_ticks.is_empty() {
            if let Some((x0, x1)) = panel.x_range {
                for value in auto_ticks(x0, x1) {
                    let x = vp.x(value);
                    svg.push_str(&format!(
                        r#"  <line x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="{FRAME_COLOR}" stroke-width="1"/>"#,
                        x = px(x),
                        y1 = px(bottom),
                        y2 = px(bottom + 5.0),
                    ));
                    svg.push('\n');
                    svg.push_str(&format!(
                        r#"  <text x="{x}" y="{y}" font-size="11" fill="{TEXT_COLOR}" text-anchor="middle">{label}</text>"#,
                        x = px(x),
                        y = px(bottom + 18.0),
                        label = format_tick(value),
                    ));
                    svg.push('\n');
                }
            }
        } else {
            for AxisTick { position, label } in &panel.x_ticks {
                let x = vp.x(*position);
                svg.push_str(&format!(
                    r#"  <line x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="{FRAME_COLOR}" stroke-width="1"/>"#,
                    x = px(x),
                    y1 = px(bottom),
                    y2 = px(bottom + 5.0),
                ));
                svg.push('\n');
                svg.push_str(&format!(
                    r#"  <text x="{x}" y="{y}" font-size="10" fill="{TEXT_COLOR}" text-anchor="end" transform="rotate(-30 {x} {y})">{label}</text>"#,
                    x = px(x),
                    y = px(bottom + 16.0),
                    label = xml_escape(label),
                ));
                svg.push('\n');
            }
        }

        if let Some(x_label) = &panel.x_label {
            let offset = if panel.x_ticks.is_empty() { 36.0 } else { 84.0 };
            svg.push_str(&format!(
                r#"  <text x="{x}" y="{y}" font-size="12" fill="{TEXT_COLOR}" text-anchor="middle">{label}</text>"#,
                x = px(vp.left + vp.width / 2.0),
                y = px(bottom + offset),
                label = xml_escape(x_label),
            ));
            svg.push('\n');
        }

        svg
    }

    fn render_primitive(&self, primitive: &Primitive, vp: &Viewport) -> String {
        match primitive {
            Primitive::Bar { x0, x1, row, color } => {
                let bar_height = self.row_height as f64 * 0.6;
                let left = vp.x(*x0);
                let width = (vp.x(*x1) - left).max(2.0);
                format!(
                    "  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" rx=\"2\" fill=\"{color}\"/>\n",
                    x = px(left),
                    y = px(vp.y(*row) - bar_height / 2.0),
                    w = px(width),
                    h = px(bar_height),
                )
            }
            Primitive::Arrow {
                x0,
                y0,
                x1,
                y1,
                color,
                dashed,
            } => {
                let dash = if *dashed {
                    r#" stroke-dasharray="6,4""#
                } else {
                    ""
                };
                format!(
                    "  <line x1=\"{x1p}\" y1=\"{y1p}\" x2=\"{x2p}\" y2=\"{y2p}\" stroke=\"{color}\" stroke-width=\"1.5\" opacity=\"0.6\"{dash} marker-end=\"url(#arrowhead-{id})\"/>\n",
                    x1p = px(vp.x(*x0)),
                    y1p = px(vp.y(*y0)),
                    x2p = px(vp.x(*x1)),
                    y2p = px(vp.y(*y1)),
                    id = marker_id(color),
                )
            }
            Primitive::Label {
                x,
                y,
                text,
                anchor,
                bold,
            } => {
                let weight = if *bold { " font-weight=\"bold\"" } else { "" };
                // Nudge start-anchored labels off their anchor point
                let dx = match anchor {
                    TextAnchor::Start => 6.0,
                    TextAnchor::Middle => 0.0,
                    TextAnchor::End => -6.0,
                };
                format!(
                    "  <text x=\"{xp}\" y=\"{yp}\" font-size=\"11\"{weight} fill=\"{TEXT_COLOR}\" text-anchor=\"{anchor}\" dominant-baseline=\"middle\">{text}</text>\n",
                    xp = px(vp.x(*x) + dx),
                    yp = px(vp.y(*y)),
                    anchor = anchor_name(*anchor),
                    text = xml_escape(text),
                )
            }
            Primitive::Point { x, y, color } => format!(
                "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"5\" fill=\"{color}\" opacity=\"0.85\"/>\n",
                cx = px(vp.x(*x)),
                cy = px(vp.y(*y)),
            ),
            Primitive::Wedge {
                label,
                start_angle,
                end_angle,
                color,
                pct_label,
                ..
            } => self.render_wedge(label, *start_angle, *end_angle, color, pct_label, vp),
            Primitive::Node {
                x,
                y,
                width,
                height,
                color,
            } => format!(
                "  <rect x=\"{xp}\" y=\"{yp}\" width=\"{w}\" height=\"{h}\" rx=\"8\" fill=\"{color}\" stroke=\"{TEXT_COLOR}\" stroke-width=\"1\"/>\n",
                xp = px(vp.x(*x)),
                yp = px(vp.y(*y + *height)),
                w = px(vp.x_scale(*width)),
                h = px(vp.y_scale(*height)),
            ),
            Primitive::Placeholder { text } => format!(
                "  <text x=\"{x}\" y=\"{y}\" font-size=\"14\" fill=\"{MUTED_TEXT_COLOR}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{text}</text>\n",
                x = px(vp.left + vp.width / 2.0),
                y = px(vp.top + vp.height / 2.0),
                text = xml_escape(text),
            ),
        }
    }

    fn render_wedge(
        &self,
        label: &str,
        start_angle: f64,
        end_angle: f64,
        color: &str,
        pct_label: &str,
        vp: &Viewport,
    ) -> String {
        let cx = vp.left + vp.width / 2.0;
        let cy = vp.top + vp.height / 2.0;
        let radius = (vp.width.min(vp.height) * 0.38).max(10.0);
        let span = end_angle - start_angle;
        let mid = (start_angle + end_angle) / 2.0;

        let mut svg = String::new();
        if span >= 359.999 {
            svg.push_str(&format!(
                "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{color}\" stroke=\"{BACKGROUND_COLOR}\" stroke-width=\"1\"/>\n",
                cx = px(cx),
                cy = px(cy),
                r = px(radius),
            ));
        } else {
            let (sx, sy) = polar(cx, cy, radius, start_angle);
            let (ex, ey) = polar(cx, cy, radius, end_angle);
            let large_arc = i32::from(span > 180.0);
            svg.push_str(&format!(
                "  <path d=\"M {cx} {cy} L {sx} {sy} A {r} {r} 0 {large_arc} 0 {ex} {ey} Z\" fill=\"{color}\" stroke=\"{BACKGROUND_COLOR}\" stroke-width=\"1\"/>\n",
                cx = px(cx),
                cy = px(cy),
                sx = px(sx),
                sy = px(sy),
                r = px(radius),
                ex = px(ex),
                ey = px(ey),
            ));
        }

        let (px_x, px_y) = polar(cx, cy, radius * 0.6, mid);
        svg.push_str(&format!(
            "  <text x=\"{x}\" y=\"{y}\" font-size=\"11\" fill=\"{TEXT_COLOR}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{pct}</text>\n",
            x = px(px_x),
            y = px(px_y),
            pct = xml_escape(pct_label),
        ));

        let (lx, ly) = polar(cx, cy, radius * 1.15, mid);
        let anchor = if mid.to_radians().cos() > 0.1 {
            "start"
        } else if mid.to_radians().cos() < -0.1 {
            "end"
        } else {
            "middle"
        };
        svg.push_str(&format!(
            "  <text x=\"{x}\" y=\"{y}\" font-size=\"12\" fill=\"{TEXT_COLOR}\" text-anchor=\"{anchor}\" dominant-baseline=\"middle\">{label}</text>\n",
            x = px(lx),
            y = px(ly),
            label = xml_escape(label),
        ));

        svg
    }

    fn render_legend(&self, entries: &[LegendEntry], vp: &Viewport) -> String {
        let mut svg = String::new();
        let left = vp.left + vp.width - 140.0;
        for (i, entry) in entries.iter().enumerate() {
            let y = vp.top + 10.0 + i as f64 * 18.0;
            if entry.dashed {
                svg.push_str(&format!(
                    "  <line x1=\"{x1}\" y1=\"{cy}\" x2=\"{x2}\" y2=\"{cy}\" stroke=\"{color}\" stroke-width=\"1.5\" stroke-dasharray=\"6,4\"/>\n",
                    x1 = px(left),
                    x2 = px(left + 14.0),
                    cy = px(y + 5.0),
                    color = entry.color,
                ));
            } else {
                svg.push_str(&format!(
                    "  <rect x=\"{x}\" y=\"{y}\" width=\"14\" height=\"10\" fill=\"{color}\"/>\n",
                    x = px(left),
                    y = px(y),
                    color = entry.color,
                ));
            }
            svg.push_str(&format!(
                "  <text x=\"{x}\" y=\"{y}\" font-size=\"11\" fill=\"{TEXT_COLOR}\" dominant-baseline=\"middle\">{label}</text>\n",
                x = px(left + 20.0),
                y = px(y + 5.0),
                label = xml_escape(&entry.label),
            ));
        }
        svg
    }
}

fn anchor_name(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn marker_id(color: &str) -> String {
    color
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn polar(cx: f64, cy: f64, r: f64, angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (cx + r * rad.cos(), cy - r * rad.sin())
}

/// Evenly spaced round-number tick values covering `x0..x1`.
fn auto_ticks(x0: f64, x1: f64) -> Vec<f64> {
    let span = x1 - x0;
    if span <= 0.0 {
        return Vec::new();
    }
    let step = tick_step(span);
    let mut ticks = Vec::new();
    let mut value = (x0 / step).ceil() * step;
    while value <= x1 + step * 1e-6 {
        ticks.push(if value == 0.0 { 0.0 } else { value });
        value += step;
    }
    ticks
}

fn tick_step(span: f64) -> f64 {
    let raw = span / 8.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}

/// XML-escape text content
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
