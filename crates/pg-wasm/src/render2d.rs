//! Canvas2D renderer.
//!
//! Draws the open zone to an HTML `<canvas>` that covers the viewport
//! element, via `CanvasRenderingContext2d`. Geometry comes from `pg-render`,
//! so hit testing and drawing always agree.

use pg_core::graph::ActionGraph;
use pg_core::icon::{IconResolver, TaskIcon};
use pg_core::model::{DeviceClass, TriggerKind, Zone};
use pg_core::transform::{ScreenPoint, ScreenRect};
use pg_render::connector::{arrowhead, connector_lines, connector_style};
use pg_render::hit::{MarkerMetrics, marker_of};
use pg_render::paint::Overlay;
use std::f64::consts::TAU;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub device_frame: &'static str,
    pub device_fill: &'static str,
    pub marker_fill: &'static str,
    pub marker_rim: &'static str,
    pub completed_fill: &'static str,
    pub locked_fill: &'static str,
    pub label: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            device_frame: "#D1D1D6",
            device_fill: "#FFFFFF",
            marker_fill: "#FFFFFF",
            marker_rim: "#334155",
            completed_fill: "#D1FAE5",
            locked_fill: "#E5E7EB",
            label: "#1D1D1F",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            device_frame: "#3A3A3C",
            device_fill: "#2C2C2E",
            marker_fill: "#3A3A3C",
            marker_rim: "#E5E5EA",
            completed_fill: "#065F46",
            locked_fill: "#48484A",
            label: "#F5F5F7",
        }
    }
}

/// Marker glyphs for the closed icon set.
pub struct GlyphIcons;

impl IconResolver for GlyphIcons {
    type Renderable = &'static str;

    fn resolve(&self, icon: TaskIcon) -> &'static str {
        match icon {
            TaskIcon::Pin => "📍",
            TaskIcon::Star => "⭐",
            TaskIcon::Flag => "🚩",
            TaskIcon::Key => "🔑",
            TaskIcon::Lock => "🔒",
            TaskIcon::Question => "❓",
            TaskIcon::Camera => "📷",
            TaskIcon::Map => "🗺",
            TaskIcon::Trophy => "🏆",
            TaskIcon::Puzzle => "🧩",
            TaskIcon::Music => "🎵",
            TaskIcon::Book => "📖",
        }
    }
}

/// Everything one frame needs besides the zone itself.
pub struct Frame<'a> {
    pub device: DeviceClass,
    /// Viewport element rect; the `<canvas>` covers it exactly.
    pub viewport: ScreenRect,
    pub canvas: ScreenRect,
    pub metrics: MarkerMetrics,
    pub overlay: Overlay<'a>,
    pub theme: &'a CanvasTheme,
}

/// Render the zone to a Canvas2D context.
pub fn render_zone(ctx: &CanvasRenderingContext2d, zone: &Zone, frame: &Frame<'_>) {
    let theme = frame.theme;
    ctx.save();
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, frame.viewport.width as f64, frame.viewport.height as f64);
    // Draw in client coordinates from here on.
    let _ = ctx.translate(-frame.viewport.left as f64, -frame.viewport.top as f64);

    draw_device_frame(ctx, frame.canvas, theme);

    for line in connector_lines(zone, frame.device, frame.canvas, frame.metrics) {
        let style = connector_style(line.connector.trigger);
        draw_line(ctx, line.from, line.to, style.css, style.width, style.dash);
        draw_arrowhead(ctx, line.from, line.to, style.css);
    }

    let graph = ActionGraph::build(zone);
    let icons = GlyphIcons;
    for (order, task) in zone.tasks.iter().enumerate() {
        let (center, radius) = marker_of(task, frame.device, frame.canvas, frame.metrics);
        let (cx, cy, r) = (center.x as f64, center.y as f64, radius as f64);

        let fill = if task.completed {
            theme.completed_fill
        } else if graph.is_unlock_target(task.id) {
            theme.locked_fill
        } else {
            theme.marker_fill
        };
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, r, 0.0, TAU);
        ctx.set_fill_style_str(fill);
        ctx.fill();
        ctx.set_stroke_style_str(theme.marker_rim);
        ctx.set_line_width(1.5);
        ctx.stroke();

        if frame.overlay.marked.is_some_and(|m| m.contains(&task.id)) {
            draw_ring(ctx, cx, cy, r + 3.0, "#F59E0B");
        }
        if frame.overlay.selected == Some(task.id) {
            draw_ring(ctx, cx, cy, r + 6.0, "#2563EB");
        }

        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font(&format!("{}px system-ui, sans-serif", (r * 0.9).round()));
        let _ = ctx.fill_text(icons.resolve(task.icon), cx, cy);

        let display = zone.display;
        ctx.set_fill_style_str(theme.label);
        ctx.set_font("11px Inter, system-ui, sans-serif");
        let mut label = String::new();
        if display.show_order {
            label.push_str(&format!("{}. ", order + 1));
        }
        if display.show_names {
            label.push_str(&task.title);
        }
        if display.show_scores {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&format!("({} pts)", task.points));
        }
        if display.show_status && task.completed {
            label.push_str(" ✓");
        }
        if !label.is_empty() {
            let _ = ctx.fill_text(label.trim(), cx, cy + r + 10.0);
        }
    }

    if let Some((from, to, trigger)) = frame.overlay.rubber_band {
        draw_rubber_band(ctx, from, to, trigger);
    }
    if let Some(rect) = frame.overlay.marquee {
        draw_marquee_rect(ctx, rect);
    }
    ctx.restore();
}

// ─── Pieces ──────────────────────────────────────────────────────────────

fn draw_device_frame(ctx: &CanvasRenderingContext2d, canvas: ScreenRect, theme: &CanvasTheme) {
    let (x, y, w, h) = (
        canvas.left as f64,
        canvas.top as f64,
        canvas.width as f64,
        canvas.height as f64,
    );
    ctx.set_fill_style_str(theme.device_fill);
    ctx.fill_rect(x, y, w, h);
    ctx.set_stroke_style_str(theme.device_frame);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, w, h);
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: &[f64]) {
    let pattern: js_sys::Array = dash.iter().map(|d| JsValue::from_f64(*d)).collect();
    let _ = ctx.set_line_dash(&pattern);
}

fn draw_line(
    ctx: &CanvasRenderingContext2d,
    from: ScreenPoint,
    to: ScreenPoint,
    color: &str,
    width: f64,
    dash: &[f64],
) {
    ctx.save();
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.set_line_cap("round");
    set_dash(ctx, dash);
    ctx.begin_path();
    ctx.move_to(from.x as f64, from.y as f64);
    ctx.line_to(to.x as f64, to.y as f64);
    ctx.stroke();
    ctx.restore();
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, from: ScreenPoint, to: ScreenPoint, color: &str) {
    let [tip, left, right] = arrowhead(from, to, 10.0);
    ctx.begin_path();
    ctx.move_to(tip.x as f64, tip.y as f64);
    ctx.line_to(left.x as f64, left.y as f64);
    ctx.line_to(right.x as f64, right.y as f64);
    ctx.close_path();
    ctx.set_fill_style_str(color);
    ctx.fill();
}

fn draw_ring(ctx: &CanvasRenderingContext2d, cx: f64, cy: f64, r: f64, color: &str) {
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, r, 0.0, TAU);
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(2.0);
    ctx.stroke();
}

fn draw_rubber_band(ctx: &CanvasRenderingContext2d, from: ScreenPoint, to: ScreenPoint, trigger: TriggerKind) {
    let style = connector_style(trigger);
    draw_line(ctx, from, to, style.css, style.width, &[6.0, 6.0]);
}

fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, rect: ScreenRect) {
    let (x, y, w, h) = (
        rect.left as f64,
        rect.top as f64,
        rect.width as f64,
        rect.height as f64,
    );
    if w < 1.0 && h < 1.0 {
        return;
    }
    ctx.save();
    ctx.set_fill_style_str("rgba(37, 99, 235, 0.08)");
    ctx.fill_rect(x, y, w, h);
    ctx.set_stroke_style_str("rgba(37, 99, 235, 0.6)");
    ctx.set_line_width(1.0);
    set_dash(ctx, &[4.0, 4.0]);
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_icon_has_a_glyph() {
        let glyphs: Vec<&str> = TaskIcon::ALL.into_iter().map(|i| GlyphIcons.resolve(i)).collect();
        assert!(glyphs.iter().all(|g| !g.is_empty()));
        let mut unique = glyphs.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), glyphs.len());
    }
}
